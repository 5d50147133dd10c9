//! Font descriptor for text rendering.

/// Font configuration for text rendering.
///
/// Describes which font to use, including family name, weight, and style.
/// The same descriptor is used to measure text for bounds clamping and to
/// draw it during export, so both agree on the element size.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDescriptor {
    /// Font family name (e.g., "Sans", "Pacifico", "Dancing Script")
    pub family: String,

    /// Font weight (e.g., "normal", "bold", "light")
    pub weight: String,

    /// Font style (e.g., "normal", "italic", "oblique")
    pub style: String,
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self::family("Sans")
    }
}

impl FontDescriptor {
    /// Creates a new font descriptor with the specified parameters.
    pub fn new(family: String, weight: String, style: String) -> Self {
        Self {
            family,
            weight,
            style,
        }
    }

    /// Regular-weight, upright descriptor for the given family.
    pub fn family(family: impl Into<String>) -> Self {
        Self::new(family.into(), "normal".to_string(), "normal".to_string())
    }

    /// Converts this font descriptor to a Pango font description string.
    ///
    /// Format: "Family Style Weight" (size is applied separately in pixels).
    /// Example: "Sans Bold" or "Monospace Italic"
    pub fn to_pango_string(&self) -> String {
        let mut parts = vec![self.family.clone()];

        if self.style.to_lowercase() != "normal" {
            parts.push(capitalize_first(&self.style));
        }

        if self.weight.to_lowercase() != "normal" {
            parts.push(capitalize_first(&self.weight));
        }

        parts.join(" ")
    }

    /// Builds a Pango description with an absolute size in device pixels.
    pub fn to_pango_description(&self, size_px: f64) -> pango::FontDescription {
        let mut desc = pango::FontDescription::from_string(&self.to_pango_string());
        // from_string treats a trailing number as a size, so pin the family explicitly
        desc.set_family(&self.family);
        desc.set_absolute_size(size_px * pango::SCALE as f64);
        desc
    }
}

/// Capitalizes the first letter of a string.
fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}
