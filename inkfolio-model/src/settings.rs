use serde::{Deserialize, Serialize};

/// Where the landing hero image comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "snake_case")]
pub enum HeroSource {
    #[default]
    LatestFeatured,
    LatestTattoo,
    MostPopular,
    SpecificTattoo,
    CustomImage,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "lowercase")]
pub enum BackgroundSize {
    #[default]
    Cover,
    Contain,
    Auto,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct HeroSettings {
    pub source: HeroSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specific_tattoo_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_image_public_id: Option<String>,
    pub background_size: BackgroundSize,
    pub background_position: String,
    pub overlay_opacity: f32,
    pub title: String,
    pub subtitle: String,
}

/// The "about the artist" section. The stat fields keep their snake_case wire
/// names, unlike the rest of the document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AboutSettings {
    pub title: String,
    pub paragraph1: String,
    pub paragraph2: String,
    #[serde(rename = "stat1_value")]
    pub stat1_value: String,
    #[serde(rename = "stat1_label")]
    pub stat1_label: String,
    #[serde(rename = "stat2_value")]
    pub stat2_value: String,
    #[serde(rename = "stat2_label")]
    pub stat2_label: String,
    #[serde(rename = "stat3_value")]
    pub stat3_value: String,
    #[serde(rename = "stat3_label")]
    pub stat3_label: String,
    pub image_url: String,
    pub image_public_id: String,
    pub experience_year: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct FooterSettings {
    pub contact_title: String,
    pub contact_subtitle: String,
    pub title: String,
    pub tagline: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub instagram: String,
    pub whatsapp: String,
    pub facebook: String,
    pub twitter: String,
    pub copyright: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct Settings {
    #[serde(rename = "_id")]
    pub id: String,
    pub hero: HeroSettings,
    pub about: AboutSettings,
    pub footer: FooterSettings,
}

/// Partial settings update; absent sections are left untouched by the server.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(target_arch = "wasm32", derive(tsify::Tsify))]
#[cfg_attr(target_arch = "wasm32", tsify(into_wasm_abi, from_wasm_abi))]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero: Option<HeroSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<AboutSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<FooterSettings>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hero_source_uses_snake_case_wire_values() {
        assert_eq!(
            serde_json::to_string(&HeroSource::MostPopular).unwrap(),
            "\"most_popular\""
        );
    }

    #[test]
    fn about_stats_keep_snake_case_keys() {
        let about = AboutSettings {
            stat1_value: "500+".into(),
            ..Default::default()
        };
        let json = serde_json::to_string(&about).unwrap();
        assert!(json.contains("\"stat1_value\":\"500+\""));
        assert!(json.contains("\"imageUrl\""));
    }
}
