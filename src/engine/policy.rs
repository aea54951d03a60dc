//! Style policies: the single configurable record that replaces a
//! family of per-journal formatting functions.

use super::formatting::FormatSpec;
use super::role::SemanticRole;
use crate::error::{Error, Result};
use crate::model::{cm_to_twips, inches_to_twips, Alignment, Columns, PageGeometry, SectionStart};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// How the front-matter locator recognizes a DOI line.
///
/// The strict form is the default; the bare-substring form reproduces a
/// looser legacy behavior and is kept selectable rather than silently
/// dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoiMatch {
    /// Text must start with `doi:` (colon-qualified) and be longer than
    /// four characters
    #[default]
    StrictPrefix,
    /// Text must start with `doi`, colon or not
    BareSubstring,
}

/// How the references boundary paragraph is recognized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferencesMatch {
    /// Any capitalization of "references"
    #[default]
    AnyCase,
    /// Exactly lowercase "references"
    ExactCase,
}

impl ReferencesMatch {
    /// Whether `text` marks the references boundary under this policy.
    pub fn matches(&self, text: &str) -> bool {
        match self {
            ReferencesMatch::AnyCase => text.trim().to_lowercase().starts_with("references"),
            ReferencesMatch::ExactCase => text.trim().starts_with("references"),
        }
    }
}

/// Per-role formatting table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleFormats {
    /// Title format
    pub title: FormatSpec,
    /// Author list format
    pub author: FormatSpec,
    /// Affiliation format
    pub affiliation: FormatSpec,
    /// Article-type line format
    pub article_type: FormatSpec,
    /// DOI line format
    pub doi_number: FormatSpec,
    /// Abstract format
    pub abstract_text: FormatSpec,
    /// Keyword list format
    pub keyword: FormatSpec,
    /// Heading 1 format
    pub heading1: FormatSpec,
    /// Heading 2 format
    pub heading2: FormatSpec,
    /// Heading 3 format
    pub heading3: FormatSpec,
    /// Heading 4 format
    pub heading4: FormatSpec,
    /// Back-matter format
    pub back_matter: FormatSpec,
    /// Body format
    pub body: FormatSpec,
}

impl RoleFormats {
    /// Resolve the format spec for a semantic role.
    pub fn for_role(&self, role: SemanticRole) -> &FormatSpec {
        match role {
            SemanticRole::Title => &self.title,
            SemanticRole::Author => &self.author,
            SemanticRole::Affiliation => &self.affiliation,
            SemanticRole::ArticleType => &self.article_type,
            SemanticRole::DoiNumber => &self.doi_number,
            SemanticRole::Abstract => &self.abstract_text,
            SemanticRole::Keyword => &self.keyword,
            SemanticRole::Heading(1) => &self.heading1,
            SemanticRole::Heading(2) => &self.heading2,
            SemanticRole::Heading(3) => &self.heading3,
            SemanticRole::Heading(_) => &self.heading4,
            SemanticRole::BackMatter => &self.back_matter,
            SemanticRole::Body => &self.body,
        }
    }
}

/// Running header layout for non-first pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunningHeader {
    /// No running header
    None,
    /// A single centered text line, optionally ruled below
    CenteredText {
        /// Header text
        text: String,
        /// Draw a bottom border under the header line
        bordered: bool,
    },
    /// Two-cell table with a dynamic page-number field on one side and
    /// a static journal citation on the other, mirrored between odd and
    /// even pages
    MirroredCitation {
        /// Journal citation string
        citation: String,
        /// Citation font size in points
        size_pts: f32,
    },
}

/// Running footer layout for non-first pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunningFooter {
    /// No running footer
    None,
    /// A single centered page-number field
    CenteredPageField,
}

/// First-page masthead assets and copyright line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Masthead {
    /// Left header image path
    pub left_image: PathBuf,
    /// Right header image path
    pub right_image: PathBuf,
    /// Footer image path
    pub footer_image: PathBuf,
    /// Copyright line next to the footer image
    pub copyright: String,
    /// Displayed image width in centimeters
    pub image_width_cm: f64,
    /// Displayed image height in centimeters
    pub image_height_cm: f64,
}

/// One publication house style: role formats plus layout flags.
///
/// Columns and masthead are independent axes; any preset may combine a
/// single-column layout with a masthead first page or vice versa.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StylePolicy {
    /// Policy name (registry key)
    pub name: String,

    /// Per-role formatting table
    pub roles: RoleFormats,

    /// Page size and margins
    pub page: PageGeometry,

    /// Column configuration
    pub columns: Columns,

    /// Section start type applied to every section
    pub section_start: SectionStart,

    /// Distinct first-page header/footer
    pub title_page: bool,

    /// Distinct odd/even running headers
    pub distinct_even_odd: bool,

    /// Enable continuous line numbering at this distance (twips)
    pub line_numbering: Option<i64>,

    /// Running header layout
    pub header: RunningHeader,

    /// Running footer layout
    pub footer: RunningFooter,

    /// First-page masthead, if the style carries one
    pub masthead: Option<Masthead>,

    /// Rule the title paragraph with top and bottom borders
    pub title_borders: bool,

    /// DOI recognition strictness
    pub doi_match: DoiMatch,

    /// References boundary case policy
    pub references_match: ReferencesMatch,

    /// Inline image scale factor applied during isolation
    pub image_scale: f64,

    /// First-line indent after headings, in twips
    pub first_line_indent_twips: i64,

    /// Placeholder text for an inserted DOI line
    pub doi_placeholder: String,

    /// Placeholder text for an inserted paper-type line
    pub paper_type_placeholder: String,
}

impl StylePolicy {
    /// Tech Science Press journal style: Minion Pro, single column,
    /// masthead first page, mirrored page-number headers, line numbers.
    pub fn tech_science() -> Self {
        let font = "Minion Pro";
        Self {
            name: "tech-science".into(),
            roles: RoleFormats {
                title: FormatSpec::new(font, 14.0).bold().align(Alignment::Left),
                author: FormatSpec::new(font, 12.0).bold().align(Alignment::Left),
                affiliation: FormatSpec::new(font, 9.0).align(Alignment::Left),
                article_type: FormatSpec::new(font, 9.0)
                    .bold()
                    .underline()
                    .align(Alignment::Left),
                doi_number: FormatSpec::new(font, 7.0).align(Alignment::Left),
                abstract_text: FormatSpec::new(font, 10.0).align(Alignment::Left),
                keyword: FormatSpec::new(font, 10.0).align(Alignment::Left),
                heading1: FormatSpec::new(font, 11.0).bold().align(Alignment::Left),
                heading2: FormatSpec::new(font, 11.0)
                    .bold()
                    .italic()
                    .align(Alignment::Left),
                heading3: FormatSpec::new(font, 11.0).italic().align(Alignment::Left),
                heading4: FormatSpec::new(font, 11.0).italic().align(Alignment::Left),
                back_matter: FormatSpec::new(font, 10.0).align(Alignment::Left),
                body: FormatSpec::new(font, 10.0).align(Alignment::Justify),
            },
            page: PageGeometry {
                width_twips: cm_to_twips(21.59),
                height_twips: cm_to_twips(27.95),
                margin_top_twips: cm_to_twips(2.54),
                margin_bottom_twips: cm_to_twips(2.54),
                margin_left_twips: cm_to_twips(2.54),
                margin_right_twips: cm_to_twips(2.54),
            },
            columns: Columns::single(),
            section_start: SectionStart::Continuous,
            title_page: true,
            distinct_even_odd: true,
            line_numbering: Some(360),
            header: RunningHeader::MirroredCitation {
                citation: "Comput Mater Contin. 2025;volume(issue)".into(),
                size_pts: 10.0,
            },
            footer: RunningFooter::None,
            masthead: Some(Masthead {
                left_image: PathBuf::from("images/left_image.jpg"),
                right_image: PathBuf::from("images/right_image.jpg"),
                footer_image: PathBuf::from("images/footer_image.jpg"),
                copyright: "Copyright © 2025 The Author(s). Published by Tech Science Press. \
                            This work is licensed under a Creative Commons Attribution 4.0 \
                            International License."
                    .into(),
                image_width_cm: 3.0,
                image_height_cm: 1.5,
            }),
            title_borders: false,
            doi_match: DoiMatch::StrictPrefix,
            references_match: ReferencesMatch::AnyCase,
            image_scale: 0.85,
            first_line_indent_twips: cm_to_twips(0.5),
            doi_placeholder: "DOI: _________________".into(),
            paper_type_placeholder: "Paper Type (_________________)".into(),
        }
    }

    /// SmartCity proceedings style: Palatino Linotype, two columns,
    /// ruled centered header, centered footer page number.
    pub fn smart_city() -> Self {
        let font = "Palatino Linotype";
        Self {
            name: "smart-city".into(),
            roles: RoleFormats {
                title: FormatSpec::new(font, 18.0).bold().align(Alignment::Center),
                author: FormatSpec::new(font, 10.0).bold().align(Alignment::Left),
                affiliation: FormatSpec::new(font, 9.0).align(Alignment::Left),
                article_type: FormatSpec::new(font, 10.0)
                    .italic()
                    .align(Alignment::Left),
                doi_number: FormatSpec::new(font, 8.0).align(Alignment::Left),
                abstract_text: FormatSpec::new(font, 10.0).align(Alignment::Justify),
                keyword: FormatSpec::new(font, 10.0).align(Alignment::Justify),
                heading1: FormatSpec::new(font, 12.0).bold().align(Alignment::Left),
                heading2: FormatSpec::new(font, 12.0).bold().align(Alignment::Left),
                heading3: FormatSpec::new(font, 12.0).bold().align(Alignment::Left),
                heading4: FormatSpec::new(font, 12.0).bold().align(Alignment::Left),
                back_matter: FormatSpec::new(font, 10.0).align(Alignment::Justify),
                body: FormatSpec::new(font, 10.0).align(Alignment::Justify),
            },
            page: PageGeometry {
                width_twips: inches_to_twips(8.5),
                height_twips: inches_to_twips(11.0),
                margin_top_twips: inches_to_twips(1.0),
                margin_bottom_twips: inches_to_twips(1.0),
                margin_left_twips: inches_to_twips(0.5),
                margin_right_twips: inches_to_twips(0.5),
            },
            columns: Columns::multi(2, 120),
            section_start: SectionStart::NewPage,
            title_page: true,
            distinct_even_odd: false,
            line_numbering: None,
            header: RunningHeader::CenteredText {
                text: "SmartCity".into(),
                bordered: true,
            },
            footer: RunningFooter::CenteredPageField,
            masthead: None,
            title_borders: true,
            doi_match: DoiMatch::StrictPrefix,
            references_match: ReferencesMatch::AnyCase,
            image_scale: 0.85,
            first_line_indent_twips: cm_to_twips(0.5),
            doi_placeholder: "DOI: _________________".into(),
            paper_type_placeholder: "Paper Type (_________________)".into(),
        }
    }

    /// Generic two-column conference style: Times New Roman, centered
    /// front matter, no running headers.
    pub fn conference() -> Self {
        let font = "Times New Roman";
        Self {
            name: "conference".into(),
            roles: RoleFormats {
                title: FormatSpec::new(font, 18.0).bold().align(Alignment::Center),
                author: FormatSpec::new(font, 10.0).bold().align(Alignment::Center),
                affiliation: FormatSpec::new(font, 8.0)
                    .italic()
                    .align(Alignment::Center),
                article_type: FormatSpec::new(font, 10.0)
                    .italic()
                    .align(Alignment::Left),
                doi_number: FormatSpec::new(font, 8.0).align(Alignment::Left),
                abstract_text: FormatSpec::new(font, 10.0).align(Alignment::Justify),
                keyword: FormatSpec::new(font, 10.0).align(Alignment::Justify),
                heading1: FormatSpec::new(font, 12.0).bold().align(Alignment::Left),
                heading2: FormatSpec::new(font, 12.0).italic().align(Alignment::Left),
                heading3: FormatSpec::new(font, 12.0).italic().align(Alignment::Left),
                heading4: FormatSpec::new(font, 12.0).italic().align(Alignment::Left),
                back_matter: FormatSpec::new(font, 10.0).align(Alignment::Justify),
                body: FormatSpec::new(font, 10.0).align(Alignment::Justify),
            },
            page: PageGeometry {
                width_twips: inches_to_twips(8.5),
                height_twips: inches_to_twips(11.0),
                margin_top_twips: inches_to_twips(1.0),
                margin_bottom_twips: inches_to_twips(1.0),
                margin_left_twips: inches_to_twips(0.5),
                margin_right_twips: inches_to_twips(0.5),
            },
            columns: Columns::multi(2, 720),
            section_start: SectionStart::NewPage,
            title_page: false,
            distinct_even_odd: false,
            line_numbering: None,
            header: RunningHeader::None,
            footer: RunningFooter::None,
            masthead: None,
            title_borders: false,
            doi_match: DoiMatch::StrictPrefix,
            references_match: ReferencesMatch::AnyCase,
            image_scale: 0.85,
            first_line_indent_twips: cm_to_twips(0.5),
            doi_placeholder: "DOI: _________________".into(),
            paper_type_placeholder: "Paper Type (_________________)".into(),
        }
    }

    /// Usable body width under this policy's page geometry.
    pub fn usable_width_twips(&self) -> i64 {
        self.page.usable_width_twips()
    }
}

impl Default for StylePolicy {
    fn default() -> Self {
        Self::tech_science()
    }
}

/// Registry of named style policies.
///
/// Maps policy names to their records and backs the CLI's `--policy`
/// lookup.
#[derive(Debug, Clone, Default)]
pub struct PolicyRegistry {
    policies: HashMap<String, StylePolicy>,
}

impl PolicyRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            policies: HashMap::new(),
        }
    }

    /// Create a registry with the built-in presets.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(StylePolicy::tech_science());
        registry.register(StylePolicy::smart_city());
        registry.register(StylePolicy::conference());
        registry
    }

    /// Register a policy under its own name.
    pub fn register(&mut self, policy: StylePolicy) {
        self.policies.insert(policy.name.to_lowercase(), policy);
    }

    /// Look up a policy by name (case-insensitive).
    pub fn get(&self, name: &str) -> Result<&StylePolicy> {
        self.policies
            .get(&name.to_lowercase())
            .ok_or_else(|| Error::InvalidPolicy(format!("unknown policy: {}", name)))
    }

    /// Registered policy names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.policies.values().map(|p| p.name.as_str()).collect();
        names.sort_unstable();
        names
    }
}
