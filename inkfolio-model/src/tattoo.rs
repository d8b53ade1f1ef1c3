use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Category, Style};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct TattooImage {
    pub url: String,
    pub public_id: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// The backend stores sizes as Spanish literals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
pub enum TattooSize {
    #[serde(rename = "pequeño")]
    Small,
    #[default]
    #[serde(rename = "mediano")]
    Medium,
    #[serde(rename = "grande")]
    Large,
    #[serde(rename = "extra-grande")]
    ExtraLarge,
}

impl TattooSize {
    pub fn as_str(self) -> &'static str {
        match self {
            TattooSize::Small => "pequeño",
            TattooSize::Medium => "mediano",
            TattooSize::Large => "grande",
            TattooSize::ExtraLarge => "extra-grande",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
pub enum BodyPart {
    #[serde(rename = "brazo")]
    Arm,
    #[serde(rename = "pierna")]
    Leg,
    #[serde(rename = "espalda")]
    Back,
    #[serde(rename = "pecho")]
    Chest,
    #[serde(rename = "cuello")]
    Neck,
    #[serde(rename = "mano")]
    Hand,
    #[serde(rename = "pie")]
    Foot,
    #[serde(rename = "torso")]
    Torso,
    #[default]
    #[serde(rename = "otro")]
    Other,
}

impl BodyPart {
    pub fn as_str(self) -> &'static str {
        match self {
            BodyPart::Arm => "brazo",
            BodyPart::Leg => "pierna",
            BodyPart::Back => "espalda",
            BodyPart::Chest => "pecho",
            BodyPart::Neck => "cuello",
            BodyPart::Hand => "mano",
            BodyPart::Foot => "pie",
            BodyPart::Torso => "torso",
            BodyPart::Other => "otro",
        }
    }
}

/// A tattoo as the backend returns it in list and detail responses, with the
/// category and style populated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct Tattoo {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<TattooImage>,
    pub category: Category,
    pub style: Style,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub size: TattooSize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default)]
    pub body_part: BodyPart,
    #[serde(default)]
    pub is_portfolio: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub views: u32,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub position: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for creating a tattoo. Category and style are sent as ids.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct TattooDraft {
    pub title: String,
    pub description: String,
    pub images: Vec<TattooImage>,
    pub category: String,
    pub style: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<TattooSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_part: Option<BodyPart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

/// Partial update for a tattoo; only present fields are sent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct TattooPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<TattooImage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<TattooSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_part: Option<BodyPart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
}

impl TattooPatch {
    pub fn featured(value: bool) -> Self {
        Self {
            is_featured: Some(value),
            ..Default::default()
        }
    }

    pub fn published(value: bool) -> Self {
        Self {
            is_published: Some(value),
            ..Default::default()
        }
    }
}
