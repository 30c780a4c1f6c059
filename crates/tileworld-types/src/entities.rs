//! Colours, tiles, and holes.
//!
//! A [`Tile`] is owned either by the world's tile collection or by exactly
//! one agent's carried-tile slot; it moves between them by value. A
//! [`Hole`]'s depth can only be lowered through [`Hole::fill_one`].

use serde::{Deserialize, Serialize};

/// Rejected colour token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid colour token {token:?}: must be non-empty and contain no whitespace")]
pub struct InvalidColor {
    /// The token that was rejected.
    pub token: String,
}

/// A palette colour, as written in the startup description (e.g. `R`, `red`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    /// Validate and wrap a colour token.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidColor`] if the token is empty or contains whitespace.
    pub fn new(token: impl Into<String>) -> Result<Self, InvalidColor> {
        let token = token.into();
        if token.is_empty() || token.chars().any(char::is_whitespace) {
            return Err(InvalidColor { token });
        }
        Ok(Self(token))
    }

    /// The colour token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First character of the token, used by the grid renderer.
    pub fn initial(&self) -> char {
        // Non-empty by construction.
        self.0.chars().next().unwrap_or('?')
    }
}

impl TryFrom<String> for Color {
    type Error = InvalidColor;

    fn try_from(token: String) -> Result<Self, Self::Error> {
        Self::new(token)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

impl core::fmt::Display for Color {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A coloured tile. Its position is the cell it lies on or the position of
/// the agent carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    /// The tile's colour.
    pub color: Color,
}

impl Tile {
    /// Create a tile of the given colour.
    pub const fn new(color: Color) -> Self {
        Self { color }
    }
}

/// A hole that accepts tiles until its depth reaches zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hole {
    /// Colour that earns points when a matching tile is used.
    color: Color,
    /// Remaining depth. Never increases.
    depth: u32,
}

impl Hole {
    /// Create a hole with the given colour and starting depth.
    pub const fn new(color: Color, depth: u32) -> Self {
        Self { color, depth }
    }

    /// The hole's colour.
    pub const fn color(&self) -> &Color {
        &self.color
    }

    /// Remaining depth.
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// Whether the hole is inert (depth 0).
    pub const fn is_filled(&self) -> bool {
        self.depth == 0
    }

    /// Lower the depth by one and return the new depth.
    ///
    /// Returns `None` and leaves the hole untouched if it is already filled.
    pub const fn fill_one(&mut self) -> Option<u32> {
        match self.depth.checked_sub(1) {
            Some(next) => {
                self.depth = next;
                Some(next)
            }
            None => None,
        }
    }
}
