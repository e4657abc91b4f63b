/// The rendered report container handed to the exporter.
///
/// Holds the HTML fragment of the report body (everything the user sees in the
/// results panel) plus the career name the fragment was rendered for. The
/// fragment is kept as text so the region can cross await points; it is parsed
/// on demand by whoever queries it.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentRegion {
    html: String,
    career_name: String,
}

impl ContentRegion {
    pub fn new(html: impl Into<String>, career_name: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            career_name: career_name.into(),
        }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn career_name(&self) -> &str {
        &self.career_name
    }

    /// True when there is no markup to extract or rasterize.
    pub fn is_empty(&self) -> bool {
        self.html.trim().is_empty()
    }
}
