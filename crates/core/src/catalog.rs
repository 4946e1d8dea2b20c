//! Static option catalogs offered by the prompt studio form.

use serde::Serialize;

/// A selectable option with a stable id and a display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub name: &'static str,
}

// ---------------------------------------------------------------------------
// Image models
// ---------------------------------------------------------------------------

/// Model used when a generation request does not name one.
pub const DEFAULT_IMAGE_MODEL_ID: &str = "6bef9f1b-29cb-40c7-b9df-32b51c1f67d3";

pub const IMAGE_MODELS: &[CatalogEntry] = &[
    CatalogEntry {
        id: DEFAULT_IMAGE_MODEL_ID,
        name: "Leonardo Diffusion XL",
    },
    CatalogEntry {
        id: "b24e16ff-06e3-43eb-8d33-4416c2d75876",
        name: "SDXL 0.9",
    },
    CatalogEntry {
        id: "1e6233eb-5197-4488-9146-170b8cb005a7",
        name: "Absolute Reality",
    },
    CatalogEntry {
        id: "291be633-cb24-434f-898f-e662799db19b",
        name: "DreamShaper v7",
    },
];

// ---------------------------------------------------------------------------
// Chat models (story generation)
// ---------------------------------------------------------------------------

pub const DEFAULT_CHAT_MODEL_ID: &str = "gpt-4o";

pub const CHAT_MODELS: &[CatalogEntry] = &[
    CatalogEntry {
        id: DEFAULT_CHAT_MODEL_ID,
        name: "GPT-4o (Advanced)",
    },
    CatalogEntry {
        id: "gpt-3.5-turbo",
        name: "GPT-3.5 Turbo (Fast)",
    },
];

// ---------------------------------------------------------------------------
// Story selections
// ---------------------------------------------------------------------------

pub const HEROES: &[CatalogEntry] = &[
    CatalogEntry {
        id: "hero1",
        name: "Hero 1",
    },
    CatalogEntry {
        id: "hero2",
        name: "Hero 2",
    },
    CatalogEntry {
        id: "hero3",
        name: "Hero 3",
    },
];

pub const CHANNELS: &[CatalogEntry] = &[
    CatalogEntry {
        id: "youtube",
        name: "YouTube",
    },
    CatalogEntry {
        id: "instagram",
        name: "Instagram",
    },
    CatalogEntry {
        id: "tiktok",
        name: "TikTok",
    },
];

/// Look up an entry by id in one of the catalogs above.
pub fn find(catalog: &'static [CatalogEntry], id: &str) -> Option<&'static CatalogEntry> {
    catalog.iter().find(|entry| entry.id == id)
}

/// Display name for `id`, falling back to the id itself for unknown entries.
pub fn display_name<'a>(catalog: &'static [CatalogEntry], id: &'a str) -> &'a str {
    match find(catalog, id) {
        Some(entry) => entry.name,
        None => id,
    }
}
