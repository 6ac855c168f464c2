/// The provider's current image, as reported by the metadata endpoint.
///
/// `url_template` is absolute but still carries the provider's default
/// `<width>x<height>.jpg` segment; it must be materialized against a
/// [`Resolution`](crate::Resolution) before download.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageOfTheDay {
    pub copyright: String,
    pub url_template: String,
}

impl ImageOfTheDay {
    pub fn new(
        copyright: impl Into<String>,
        url_template: impl Into<String>,
    ) -> Self {
        Self {
            copyright: copyright.into(),
            url_template: url_template.into(),
        }
    }
}
