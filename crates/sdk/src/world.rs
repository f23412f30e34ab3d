//! Client world types

/// Dimension a world belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dimension {
    #[default]
    Overworld,
    Nether,
    End,
}

/// A client-side world the player has joined
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    /// Server-provided level name
    pub name: String,
    /// Dimension of this world
    pub dimension: Dimension,
}

impl World {
    pub fn new(name: impl Into<String>, dimension: Dimension) -> Self {
        Self {
            name: name.into(),
            dimension,
        }
    }
}
