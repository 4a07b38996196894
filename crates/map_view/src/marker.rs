use foundation::geo::LngLat;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Visibility {
    pub visible: bool,
}

impl Visibility {
    pub fn visible() -> Self {
        Self { visible: true }
    }

    pub fn hidden() -> Self {
        Self { visible: false }
    }
}

/// A named point drawn on top of the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub name: String,
    pub position: LngLat,
    pub visibility: Visibility,
}

impl Marker {
    pub fn new(name: impl Into<String>, position: LngLat) -> Self {
        Self {
            name: name.into(),
            position,
            visibility: Visibility::visible(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visibility.visible
    }
}
