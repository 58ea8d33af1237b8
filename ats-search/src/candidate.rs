//! Candidate documents and their search metadata.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    errors::{SearchError, ValidationError, ValidationIssue, ValidationResult},
    filters::normalizers::{build_tag_filter, build_text_filter, build_timestamp_filter},
    keys::KeyContext,
    query::TermSource,
    search::{
        FilterCondition, FilterDescriptor, IndexDefinition, IndexField, IndexFieldType, SearchEntity, SearchFields,
        SortField, SortOrder,
    },
    validators::{is_valid_email, is_valid_profile_url},
};

/// Pipeline stage a candidate currently sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Applied,
    Screening,
    Interview,
    Offer,
    Hired,
    Rejected,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Applied,
        Stage::Screening,
        Stage::Interview,
        Stage::Offer,
        Stage::Hired,
        Stage::Rejected,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Stage::Applied => "applied",
            Stage::Screening => "screening",
            Stage::Interview => "interview",
            Stage::Offer => "offer",
            Stage::Hired => "hired",
            Stage::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SearchError::invalid(format!("Unknown pipeline stage: {s}")))
    }
}

/// A candidate in a tenant's talent database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub id: String,
    pub tenant_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub current_title: String,
    #[serde(default)]
    pub current_company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub stage: Stage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    /// Stored as epoch milliseconds so the index can sort on it.
    #[serde(default = "Utc::now", with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Candidate {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Check the fields a write depends on.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut issues = Vec::new();

        for (field, value) in [
            ("tenant_id", &self.tenant_id),
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
        ] {
            if value.trim().is_empty() {
                issues.push(ValidationIssue::new(field, "required", format!("{field} must not be empty")));
            }
        }

        if !is_valid_email(&self.email) {
            issues.push(ValidationIssue::new("email", "email", "email must be a valid address"));
        }

        if let Some(url) = &self.linkedin_url
            && !is_valid_profile_url(url)
        {
            issues.push(ValidationIssue::new("linkedin_url", "url", "linkedin_url must be an http(s) URL"));
        }

        if self.skills.iter().chain(&self.tags).any(|value| value.trim().is_empty()) {
            issues.push(ValidationIssue::new("skills", "blank_item", "skills and tags must not contain blank values"));
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(issues))
        }
    }
}

impl TermSource for Candidate {
    fn text_fields(&self) -> impl Iterator<Item = &str> {
        [
            self.first_name.as_str(),
            self.last_name.as_str(),
            self.email.as_str(),
            self.current_title.as_str(),
            self.current_company.as_str(),
            self.location.as_str(),
        ]
        .into_iter()
        .chain(self.summary.as_deref())
    }

    fn array_fields(&self) -> impl Iterator<Item = &[String]> {
        [self.skills.as_slice(), self.tags.as_slice()].into_iter()
    }
}

const TEXT_FIELDS: &[&str] = &[
    "first_name",
    "last_name",
    "email",
    "current_title",
    "current_company",
    "location",
    "summary",
];
const TAG_FIELDS: &[&str] = &["skills", "tags"];

const fn text(path: &'static str, field_name: &'static str, sortable: bool) -> IndexField {
    IndexField {
        path,
        field_name,
        field_type: IndexFieldType::Text,
        sortable,
        case_sensitive: false,
    }
}

const fn tag(path: &'static str, field_name: &'static str, case_sensitive: bool) -> IndexField {
    IndexField {
        path,
        field_name,
        field_type: IndexFieldType::Tag,
        sortable: false,
        case_sensitive,
    }
}

static CANDIDATE_SCHEMA: &[IndexField] = &[
    tag("$.tenant_id", "tenant_id", true),
    text("$.first_name", "first_name", false),
    text("$.last_name", "last_name", true),
    text("$.email", "email", false),
    text("$.current_title", "current_title", false),
    text("$.current_company", "current_company", false),
    text("$.location", "location", false),
    text("$.summary", "summary", false),
    tag("$.skills[*]", "skills", true),
    tag("$.tags[*]", "tags", true),
    tag("$.stage", "stage", false),
    tag("$.source", "source", false),
    IndexField {
        path: "$.created_at",
        field_name: "created_at",
        field_type: IndexFieldType::Numeric,
        sortable: true,
        case_sensitive: false,
    },
];

static CANDIDATE_SORTS: &[SortField] = &[
    SortField {
        name: "created_at",
        path: "created_at",
        default_order: SortOrder::Desc,
    },
    SortField {
        name: "last_name",
        path: "last_name",
        default_order: SortOrder::Asc,
    },
];

impl SearchEntity for Candidate {
    const COLLECTION: &'static str = "candidates";

    fn index_definition(keys: &KeyContext<'_>) -> IndexDefinition {
        IndexDefinition {
            name: keys.index(Self::COLLECTION),
            prefixes: vec![keys.collection_prefix(Self::COLLECTION)],
            filter: None,
            schema: CANDIDATE_SCHEMA,
        }
    }

    fn allowed_sorts() -> &'static [SortField] {
        CANDIDATE_SORTS
    }

    fn default_sort() -> &'static SortField {
        &CANDIDATE_SORTS[0]
    }

    fn search_fields() -> SearchFields {
        SearchFields::new(TEXT_FIELDS, TAG_FIELDS)
    }

    fn map_filter(descriptor: FilterDescriptor) -> Result<FilterCondition, SearchError> {
        match descriptor.field.as_str() {
            "stage" => {
                let stages = descriptor
                    .values
                    .iter()
                    .map(|value| value.parse::<Stage>().map(|stage| stage.as_str().to_string()))
                    .collect::<Result<Vec<_>, _>>()?;
                build_tag_filter(FilterDescriptor { values: stages, ..descriptor }, "stage")
            }
            "source" => build_tag_filter(descriptor, "source"),
            "skills" | "skill" => build_tag_filter(descriptor, "skills"),
            "tags" | "tag" => build_tag_filter(descriptor, "tags"),
            "created_at" => build_timestamp_filter(descriptor, "created_at"),
            "location" => build_text_filter(descriptor, "location"),
            "company" | "current_company" => build_text_filter(descriptor, "current_company"),
            "title" | "current_title" => build_text_filter(descriptor, "current_title"),
            other => Err(SearchError::invalid(format!("Unknown filter field: {other}"))),
        }
    }
}
