//! Output contracts: which source columns each product reads and how they
//! are renamed.

/// Columns read from one source table.
#[derive(Debug, Clone, Copy)]
pub struct SourceSpec {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

/// One output product: its folder/base name and `(input, output)` column mapping.
#[derive(Debug, Clone, Copy)]
pub struct ProductSpec {
    pub task: u8,
    pub name: &'static str,
    pub title: &'static str,
    pub columns: &'static [(&'static str, &'static str)],
}

impl ProductSpec {
    /// File name used for the single-file case, e.g. `all_repository.csv`.
    pub fn base_name(&self) -> String {
        format!("{}.csv", self.name)
    }

    pub fn output_columns(&self) -> Vec<&'static str> {
        self.columns.iter().map(|(_, out)| *out).collect()
    }
}

pub const PULL_REQUEST_SOURCE: SourceSpec = SourceSpec {
    name: "all_pull_request",
    columns: &["title", "id", "agent", "body", "repo_id", "repo_url"],
};

pub const REPOSITORY_SOURCE: SourceSpec = SourceSpec {
    name: "all_repository",
    columns: &["id", "language", "stars", "url"],
};

pub const TASK_TYPE_SOURCE: SourceSpec = SourceSpec {
    name: "pr_task_type",
    columns: &["id", "title", "reason", "type", "confidence"],
};

pub const COMMIT_DETAILS_SOURCE: SourceSpec = SourceSpec {
    name: "pr_commit_details",
    columns: &[
        "pr_id", "sha", "message", "filename", "status", "additions", "deletions", "changes",
        "patch",
    ],
};

/// Column added to the commit details before projection.
pub const CLEANED_PATCH_COLUMN: &str = "cleaned_patch";

/// Column added to the joined table holding the 0/1 flag.
pub const SECURITY_COLUMN: &str = "SECURITY";

pub const PULL_REQUEST_PRODUCT: ProductSpec = ProductSpec {
    task: 1,
    name: "all_pull_request",
    title: "Pull Request",
    columns: &[
        ("title", "TITLE"),
        ("id", "ID"),
        ("agent", "AGENTNAME"),
        ("body", "BODYSTRING"),
        ("repo_id", "REPOID"),
        ("repo_url", "REPOURL"),
    ],
};

pub const REPOSITORY_PRODUCT: ProductSpec = ProductSpec {
    task: 2,
    name: "all_repository",
    title: "Repository",
    columns: &[
        ("id", "REPOID"),
        ("language", "LANG"),
        ("stars", "STARS"),
        ("url", "REPOURL"),
    ],
};

pub const TASK_TYPE_PRODUCT: ProductSpec = ProductSpec {
    task: 3,
    name: "pr_task_type",
    title: "PR Task Type",
    columns: &[
        ("id", "PRID"),
        ("title", "PRTITLE"),
        ("reason", "PRREASON"),
        ("type", "PRTYPE"),
        ("confidence", "CONFIDENCE"),
    ],
};

pub const COMMIT_DETAILS_PRODUCT: ProductSpec = ProductSpec {
    task: 4,
    name: "pr_commit_details",
    title: "PR Commit Details",
    columns: &[
        ("pr_id", "PRID"),
        ("sha", "PRSHA"),
        ("message", "PRCOMMITMESSAGE"),
        ("filename", "PRFILE"),
        ("status", "PRSTATUS"),
        ("additions", "PRADDS"),
        ("deletions", "PRDELSS"),
        ("changes", "PRCHANGECOUNT"),
        (CLEANED_PATCH_COLUMN, "PRDIFF"),
    ],
};

pub const SECURITY_SUMMARY_PRODUCT: ProductSpec = ProductSpec {
    task: 5,
    name: "pr_security_summary",
    title: "Security Summary",
    columns: &[
        ("ID", "ID"),
        ("AGENTNAME", "AGENT"),
        ("PRTYPE", "TYPE"),
        ("CONFIDENCE", "CONFIDENCE"),
        (SECURITY_COLUMN, "SECURITY"),
    ],
};

/// Left side of the security join, taken from the projected pull requests.
pub const SECURITY_JOIN_LEFT: &[(&str, &str)] = &[
    ("ID", "ID"),
    ("AGENTNAME", "AGENTNAME"),
    ("TITLE", "TITLE"),
    ("BODYSTRING", "BODYSTRING"),
];

/// Right side of the security join, taken from the projected task types.
pub const SECURITY_JOIN_RIGHT: &[(&str, &str)] = &[
    ("PRID", "PRID"),
    ("PRTYPE", "PRTYPE"),
    ("CONFIDENCE", "CONFIDENCE"),
];

pub const ALL_PRODUCTS: [ProductSpec; 5] = [
    PULL_REQUEST_PRODUCT,
    REPOSITORY_PRODUCT,
    TASK_TYPE_PRODUCT,
    COMMIT_DETAILS_PRODUCT,
    SECURITY_SUMMARY_PRODUCT,
];
