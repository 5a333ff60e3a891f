// Jersey catalog: the fixed, ordered list of selectable designs.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("jersey at position {position} has an empty id")]
    EmptyId { position: usize },

    #[error("duplicate jersey id `{id}`")]
    DuplicateId { id: String },
}

// ---------------------------------------------------------------------------
// JerseyRecord
// ---------------------------------------------------------------------------

/// A single jersey design. Created once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JerseyRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Base color as a `#rrggbb` hex string.
    pub color: String,
    pub front_image: Option<String>,
    pub back_image: Option<String>,
}

impl JerseyRecord {
    /// Image reference for the requested face, if one exists.
    pub fn image(&self, face: ImageFace) -> Option<&str> {
        match face {
            ImageFace::Front => self.front_image.as_deref(),
            ImageFace::Back => self.back_image.as_deref(),
        }
    }

    /// Placeholder fill for a face without an image. The back face is drawn
    /// in a darker shade of the base color.
    pub fn placeholder_color(&self, face: ImageFace) -> Rgb {
        let base = Rgb::parse_hex(&self.color).unwrap_or(Rgb::FALLBACK);
        match face {
            ImageFace::Front => base,
            ImageFace::Back => base.darken(BACK_FACE_DARKEN),
        }
    }
}

/// Amount subtracted from each RGB channel for the back-face placeholder.
pub const BACK_FACE_DARKEN: u8 = 40;

// ---------------------------------------------------------------------------
// ImageFace
// ---------------------------------------------------------------------------

/// Which side of a jersey a card is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFace {
    #[default]
    Front,
    Back,
}

impl ImageFace {
    pub fn flipped(self) -> Self {
        match self {
            ImageFace::Front => ImageFace::Back,
            ImageFace::Back => ImageFace::Front,
        }
    }

    /// Label drawn on the solid-color placeholder.
    pub fn placeholder_label(self) -> &'static str {
        match self {
            ImageFace::Front => "Front View",
            ImageFace::Back => "Back View",
        }
    }

    pub fn toggle_label(self) -> &'static str {
        match self {
            ImageFace::Front => "Front",
            ImageFace::Back => "Back",
        }
    }
}

// ---------------------------------------------------------------------------
// Rgb
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Used when a record carries a color that does not parse.
    pub const FALLBACK: Rgb = Rgb {
        r: 0x64,
        g: 0x74,
        b: 0x8b,
    };

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn parse_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
        Some(Rgb {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    pub fn darken(self, amount: u8) -> Self {
        Rgb {
            r: self.r.saturating_sub(amount),
            g: self.g.saturating_sub(amount),
            b: self.b.saturating_sub(amount),
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Ordered, immutable list of jerseys with unique ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    records: Vec<JerseyRecord>,
}

impl Catalog {
    /// Build a catalog, rejecting empty or duplicate ids.
    pub fn new(records: Vec<JerseyRecord>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for (position, record) in records.iter().enumerate() {
            if record.id.is_empty() {
                return Err(CatalogError::EmptyId { position });
            }
            if !seen.insert(record.id.as_str()) {
                return Err(CatalogError::DuplicateId {
                    id: record.id.clone(),
                });
            }
        }
        Ok(Catalog { records })
    }

    /// The five designs of the reference deployment.
    pub fn reference() -> Result<Self, CatalogError> {
        let designs = [
            ("d1", "Design 1", "Sleek modern home design", "#1e40af", "D1"),
            ("d2", "Design 2", "Bold alternate styling", "#dc2626", "D2"),
            ("d3", "Design 3", "Minimal third-kit aesthetic", "#059669", "D3"),
            ("d4", "Design 4", "Retro inspired look", "#7c3aed", "D4"),
            ("d5", "Design 5", "Exclusive limited edition", "#ea580c", "D5"),
        ];
        let records = designs
            .into_iter()
            .map(|(id, name, description, color, asset)| JerseyRecord {
                id: id.to_string(),
                name: name.to_string(),
                description: description.to_string(),
                color: color.to_string(),
                front_image: Some(format!("images/{asset}_Front.png")),
                back_image: Some(format!("images/{asset}_Back.png")),
            })
            .collect();
        Catalog::new(records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&JerseyRecord> {
        self.records.get(index)
    }

    pub fn find(&self, id: &str) -> Option<&JerseyRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JerseyRecord> {
        self.records.iter()
    }

    /// Ids in catalog order; this is what the carousel is built from.
    pub fn ids(&self) -> Vec<String> {
        self.records.iter().map(|r| r.id.clone()).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
