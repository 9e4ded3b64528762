/// A formatted run of text inside a paragraph
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub highlight: bool,
    pub font_name: Option<String>,
    pub font_size: Option<u32>, // Half-points, as stored in w:sz
}

impl Run {
    /// Plain run carrying only text
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Copy the font identity (name and size) of another run
    pub fn with_font_of(mut self, other: &Run) -> Self {
        self.font_name = other.font_name.clone();
        self.font_size = other.font_size;
        self
    }
}

/// An ordered sequence of runs making up one paragraph of the document.
///
/// The concatenation of the run texts is the paragraph's visible text. The
/// run list can only be swapped as a whole through [`Paragraph::replace_runs`],
/// which also marks the paragraph as rewritten so writers can leave every
/// other paragraph byte-identical.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Paragraph {
    runs: Vec<Run>,
    #[serde(default)]
    rewritten: bool,
}

impl Paragraph {
    pub fn new(runs: Vec<Run>) -> Self {
        Self {
            runs,
            rewritten: false,
        }
    }

    /// Single plain run paragraph
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(vec![Run::plain(text)])
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Visible text of the paragraph
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.text.is_empty())
    }

    /// Atomically replace the run sequence
    pub fn replace_runs(&mut self, runs: Vec<Run>) {
        self.runs = runs;
        self.rewritten = true;
    }

    pub fn is_rewritten(&self) -> bool {
        self.rewritten
    }
}

/// Ordered access to the paragraphs of a document (body and table cells, in
/// document order).
///
/// `paragraph_mut` returns `None` for paragraphs the container does not allow
/// to be rewritten; those are still read for extraction.
pub trait ParagraphSequence {
    fn paragraph_count(&self) -> usize;

    fn paragraph(&self, index: usize) -> Option<&Paragraph>;

    fn paragraph_mut(&mut self, index: usize) -> Option<&mut Paragraph>;
}

impl ParagraphSequence for Vec<Paragraph> {
    fn paragraph_count(&self) -> usize {
        self.len()
    }

    fn paragraph(&self, index: usize) -> Option<&Paragraph> {
        self.get(index)
    }

    fn paragraph_mut(&mut self, index: usize) -> Option<&mut Paragraph> {
        self.get_mut(index)
    }
}

/// One logical legal notice: the paragraphs that belong to it and their
/// flattened text
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Publication {
    pub index: usize,
    pub paragraphs: Vec<usize>, // Indices into the paragraph sequence
    pub text: String,           // Normalized, flattened text
}
