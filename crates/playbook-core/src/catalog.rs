//! Static mock data shown by the wizard steps.
//!
//! Nothing here talks to a warehouse: tables, stages, files, and column
//! previews are fixed so every demo walks through the same choices.

/// Tables offered on the Select data step.
pub const TABLES: &[&str] = &[
    "CSS_SCRAPE",
    "LLM_GEN_CORPUS",
    "LLM_GEN_QUERIES",
    "LLM_REL_941EB4AC271D725ABE04FD857328C251_TEMP",
];

/// Stages offered on the Select data step.
pub const STAGES: &[&str] = &[
    "ADEY_TEST_STAGE",
    "ADEY_TEST_STAGE_2",
    "DOCUMENTS_STAGE",
    "REPORTS_STAGE",
    "ARCHIVE_STAGE",
];

pub const WAREHOUSES: &[&str] = &["SNOWAD_HOC", "COMPUTE_WH", "ANALYTICS_WH"];

pub const EMBEDDING_MODELS: &[&str] = &[
    "snowflake-arctic-embed-m-v1.5",
    "voyage-multimodal-3",
    "e5-base-v2",
];

/// The only model that can embed page images.
pub const VISUAL_EMBEDDING_MODEL: &str = "voyage-multimodal-3";

pub const GENERATED_DATABASES: &[&str] = &["DB_1", "DB_2"];
pub const GENERATED_SCHEMAS: &[&str] = &["SCHEMA_A", "SCHEMA_B"];

/// A file or folder inside a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEntry {
    Folder {
        name: &'static str,
    },
    File {
        name: &'static str,
        size: &'static str,
        modified: &'static str,
    },
}

impl StageEntry {
    pub fn name(&self) -> &'static str {
        match self {
            StageEntry::Folder { name } | StageEntry::File { name, .. } => name,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, StageEntry::Folder { .. })
    }
}

const ROOT_ENTRIES: &[StageEntry] = &[
    StageEntry::Folder { name: "documents" },
    StageEntry::Folder { name: "reports" },
    StageEntry::Folder { name: "archive" },
    StageEntry::File {
        name: "readme.pdf",
        size: "1.2 MB",
        modified: "2 days ago",
    },
];

const DOCUMENTS_ENTRIES: &[StageEntry] = &[
    StageEntry::Folder { name: "contracts" },
    StageEntry::Folder { name: "invoices" },
    StageEntry::Folder { name: "policies" },
    StageEntry::File {
        name: "manual.pdf",
        size: "3.4 MB",
        modified: "1 week ago",
    },
    StageEntry::File {
        name: "guide.pdf",
        size: "2.1 MB",
        modified: "3 days ago",
    },
];

const CONTRACTS_ENTRIES: &[StageEntry] = &[
    StageEntry::File {
        name: "vendor_agreement.pdf",
        size: "856 KB",
        modified: "5 days ago",
    },
    StageEntry::File {
        name: "service_contract.pdf",
        size: "1.1 MB",
        modified: "1 week ago",
    },
    StageEntry::File {
        name: "nda.pdf",
        size: "432 KB",
        modified: "2 weeks ago",
    },
];

const REPORTS_ENTRIES: &[StageEntry] = &[
    StageEntry::Folder { name: "quarterly" },
    StageEntry::File {
        name: "monthly_report.pdf",
        size: "2.8 MB",
        modified: "1 day ago",
    },
    StageEntry::File {
        name: "annual_summary.pdf",
        size: "4.2 MB",
        modified: "1 month ago",
    },
];

/// List the entries of a stage folder. `path` is slash-separated with no
/// leading or trailing slash; the empty string is the stage root. Unknown
/// folders are empty.
pub fn stage_entries(path: &str) -> &'static [StageEntry] {
    match path.trim_matches('/') {
        "" => ROOT_ENTRIES,
        "documents" => DOCUMENTS_ENTRIES,
        "documents/contracts" => CONTRACTS_ENTRIES,
        "reports" => REPORTS_ENTRIES,
        _ => &[],
    }
}

/// Join a folder path and an entry name the way selected file paths are
/// stored.
pub fn entry_path(folder: &str, name: &str) -> String {
    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", folder, name)
    }
}

/// Every file reachable from the stage root, as full paths.
pub fn all_stage_files() -> Vec<String> {
    let mut out = Vec::new();
    let mut pending = vec![String::new()];
    while let Some(folder) = pending.pop() {
        for entry in stage_entries(&folder) {
            let path = entry_path(&folder, entry.name());
            if entry.is_folder() {
                pending.push(path);
            } else {
                out.push(path);
            }
        }
    }
    out.sort();
    out
}

/// Columns of every mock table.
pub const TABLE_COLUMNS: &[&str] = &[
    "DOC_ID",
    "TITLE",
    "CONTENT",
    "CATEGORY",
    "SUBCATEGORY",
    "TRANSCRIPT_TEXT",
    "COLUMN_A",
    "COLUMN_B",
];

/// Five sample values for a table column.
pub fn column_preview(column: &str) -> &'static [&'static str] {
    match column {
        "DOC_ID" => &["doc_101", "doc_102", "doc_103", "doc_104", "doc_105"],
        "TITLE" => &[
            "Q1 Report",
            "Project Phoenix Spec",
            "Meeting Notes",
            "Competitor Analysis",
            "User Survey Results",
        ],
        "CONTENT" => &[
            "The quick brown fox...",
            "Lorem ipsum dolor sit amet...",
            "Key takeaways from the...",
            "Our main competitor, Acme...",
            "Users reported high satisfaction...",
        ],
        "CATEGORY" => &["Finance", "Engineering", "Sales", "Strategy", "UX"],
        "SUBCATEGORY" => &[
            "Quarterly Reports",
            "Product Specs",
            "Meeting Minutes",
            "Market Research",
            "User Feedback",
        ],
        "TRANSCRIPT_TEXT" => &[
            "...so I said, let's ship it.",
            "...the user feedback was positive...",
            "...we need to focus on...",
            "...the data shows a clear trend...",
            "...our next steps will be...",
        ],
        "COLUMN_A" => &["Value A1", "Value A2", "Value A3", "Value A4", "Value A5"],
        "COLUMN_B" => &["Value B1", "Value B2", "Value B3", "Value B4", "Value B5"],
        _ => &[],
    }
}

/// A column of a table the stage pipelines generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaColumn {
    pub name: &'static str,
    pub data_type: &'static str,
    pub description: &'static str,
}

const fn col(
    name: &'static str,
    data_type: &'static str,
    description: &'static str,
) -> SchemaColumn {
    SchemaColumn {
        name,
        data_type,
        description,
    }
}

pub const VISUAL_SCHEMA: &[SchemaColumn] = &[
    col("TEXT", "VARCHAR", "The extracted text content from each page."),
    col(
        "VECTOR_MAIN",
        "VECTOR",
        "The multimodal vector embedding of the page's image.",
    ),
    col(
        "PAGE_NUMBER",
        "NUMBER",
        "The page number within the original PDF document.",
    ),
    col(
        "IMAGE_FILEPATH",
        "VARCHAR",
        "The path to the generated page image in the internal stage.",
    ),
    col("SOURCE_FILENAME", "VARCHAR", "The original PDF document filename."),
    col(
        "LAST_MODIFIED",
        "TIMESTAMP",
        "Last modification date of the source PDF.",
    ),
];

pub const TEXT_SCHEMA: &[SchemaColumn] = &[
    col("CHUNK", "VARCHAR", "A semantic chunk of text from the document."),
    col("CHUNK_VECTOR", "VECTOR", "The vector embedding of the text chunk."),
    col(
        "CHUNK_INDEX",
        "NUMBER",
        "The sequential index of the chunk within the document.",
    ),
    col("SOURCE_FILENAME", "VARCHAR", "The original PDF document filename."),
    col(
        "FILE_URL",
        "VARCHAR",
        "A URL to reference the source file within Snowflake.",
    ),
    col(
        "LAST_MODIFIED",
        "TIMESTAMP",
        "Last modification date of the source PDF.",
    ),
    col("FILE_SIZE", "NUMBER", "The size of the source file in bytes."),
    col(
        "DOCUMENT_TITLE",
        "VARCHAR",
        "The title property extracted from the PDF metadata, if available.",
    ),
];

/// Metadata columns every stage pipeline carries into the index.
pub const STAGE_METADATA_COLUMNS: &[&str] = &[
    "DOCUMENT_NAME",
    "FILE_PATH",
    "LAST_MODIFIED",
    "DOCUMENT_TITLE",
    "DOCUMENT_AUTHOR",
    "CREATION_DATE",
    "FILE_SIZE",
    "PAGE_COUNT",
    "CHUNK",
    "CHUNK_LINK",
];

/// The metadata column names as stored on the record.
pub fn stage_metadata_names() -> Vec<String> {
    STAGE_METADATA_COLUMNS
        .iter()
        .map(|c| c.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_root_listing() {
        let names: Vec<&str> = stage_entries("").iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["documents", "reports", "archive", "readme.pdf"]);
    }

    #[test]
    fn test_unknown_folder_is_empty() {
        assert!(stage_entries("archive").is_empty());
        assert!(stage_entries("nope/deeper").is_empty());
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        assert_eq!(stage_entries("documents/"), stage_entries("documents"));
    }

    #[test]
    fn test_all_stage_files() {
        let files = all_stage_files();
        assert!(files.contains(&"readme.pdf".to_string()));
        assert!(files.contains(&"documents/contracts/nda.pdf".to_string()));
        assert!(files.contains(&"reports/annual_summary.pdf".to_string()));
        assert_eq!(files.len(), 8);
    }

    #[test]
    fn test_every_column_has_a_preview() {
        for column in TABLE_COLUMNS {
            assert_eq!(column_preview(column).len(), 5, "{}", column);
        }
    }

    #[test]
    fn test_metadata_names_are_lowercase() {
        let names = stage_metadata_names();
        assert_eq!(names.len(), STAGE_METADATA_COLUMNS.len());
        assert_eq!(names[0], "document_name");
        assert_eq!(names[9], "chunk_link");
    }
}
