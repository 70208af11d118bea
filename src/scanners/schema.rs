//! Database schema detection for Prisma schemas and TypeORM entities.
//!
//! Parsing is regex based and intentionally shallow: it reads block
//! structure and decorators, not the full grammar.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::{display_path, project_files, read_lossy, ReportGenerator};

const PRISMA_FILENAME: &str = "schema.prisma";
const ENTITY_SUFFIX: &str = ".entity.ts";

/// Built-in Prisma scalar types. Any other field type names a model or enum.
const PRISMA_SCALARS: &[&str] = &[
    "String", "Boolean", "Int", "BigInt", "Float", "Decimal", "DateTime", "Json", "Bytes",
    "Unsupported",
];

static DATASOURCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\bdatasource\s+\w+\s*\{([^}]+)\}").expect("valid datasource regex")
});
static GENERATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\bgenerator\s+\w+\s*\{([^}]+)\}").expect("valid generator regex")
});
static MODEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\bmodel\s+(\w+)\s*\{([^}]+)\}").expect("valid model regex"));
static ENUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\benum\s+(\w+)\s*\{").expect("valid enum regex"));
static PROVIDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"provider\s*=\s*"([^"]+)""#).expect("valid provider regex"));
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"url\s*=\s*(.+)").expect("valid url regex"));
/// `name Type[]? attributes`
static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\w+)\s+(\w+)(\[\])?(\?)?\s*(.*)$").expect("valid field regex")
});

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@Entity\(\s*['"]([^'"]+)['"]\s*\)"#).expect("valid entity regex")
});
static CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"export\s+class\s+(\w+)").expect("valid class regex"));
/// A decorator call with one level of nested parentheses, followed by any
/// further decorators and then `member[!?]: Type`.
static COLUMN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&member_pattern(
        "Column|PrimaryGeneratedColumn|PrimaryColumn|CreateDateColumn|UpdateDateColumn|DeleteDateColumn",
    ))
    .expect("valid column regex")
});
static RELATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&member_pattern("OneToMany|ManyToOne|OneToOne|ManyToMany"))
        .expect("valid relation regex")
});

fn member_pattern(decorators: &str) -> String {
    let args = r"\((?:[^()]|\([^()]*\))*\)";
    format!(r"@({decorators}){args}(?:\s*@\w+{args})*\s+(\w+)[!?]?\s*:\s*(\w+)")
}

/// `datasource` block of a Prisma schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Datasource {
    pub provider: String,
    pub url: String,
}

/// A scalar or enum field of a Prisma model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrismaField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub is_optional: bool,
    pub attributes: String,
}

/// A field of a Prisma model whose type is another model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrismaRelation {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub is_array: bool,
    pub attributes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrismaModel {
    pub name: String,
    pub fields: Vec<PrismaField>,
    pub relations: Vec<PrismaRelation>,
}

/// One parsed `schema.prisma` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrismaSchema {
    pub path: String,
    pub datasource: Option<Datasource>,
    /// Provider of the `generator` block.
    pub generator: Option<String>,
    pub models: Vec<PrismaModel>,
}

/// A decorated member of a TypeORM entity class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityMember {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub decorator: String,
}

/// One parsed `*.entity.ts` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeOrmEntity {
    pub path: String,
    pub name: String,
    pub table: String,
    pub columns: Vec<EntityMember>,
    pub relations: Vec<EntityMember>,
}

/// Everything the schema scanner found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaDetection {
    pub prisma: Vec<PrismaSchema>,
    pub typeorm: Vec<TypeOrmEntity>,
}

impl SchemaDetection {
    pub fn is_empty(&self) -> bool {
        self.prisma.is_empty() && self.typeorm.is_empty()
    }
}

/// Detects Prisma and TypeORM schema definitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaScanner;

impl ReportGenerator for SchemaScanner {
    type Detection = SchemaDetection;

    const REPORT_FILENAME: &'static str = "db-analysis.md";

    fn detect(&self, root: &Path) -> SchemaDetection {
        let mut detection = SchemaDetection::default();
        for path in project_files(root) {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let is_prisma = name == PRISMA_FILENAME;
            let is_entity = name.ends_with(ENTITY_SUFFIX);
            if !is_prisma && !is_entity {
                continue;
            }
            let Some(content) = read_lossy(&path) else {
                tracing::debug!(path = %path.display(), "skipping unreadable schema file");
                continue;
            };
            let display = display_path(root, &path);
            if is_prisma {
                detection.prisma.push(parse_prisma(display, &content));
            } else {
                detection.typeorm.push(parse_entity(display, &content));
            }
        }
        detection
    }

    fn render(&self, detection: &SchemaDetection) -> String {
        render_report(detection)
    }

    fn summarize(&self, detection: &SchemaDetection) -> String {
        let models: usize = detection.prisma.iter().map(|s| s.models.len()).sum();
        format!(
            "db_modeler: {} prisma schema(s) with {models} model(s), {} typeorm entit{}",
            detection.prisma.len(),
            detection.typeorm.len(),
            if detection.typeorm.len() == 1 { "y" } else { "ies" },
        )
    }
}

/// Parse a Prisma schema's datasource, generator and models.
pub fn parse_prisma(path: String, content: &str) -> PrismaSchema {
    let datasource = DATASOURCE_RE.captures(content).map(|c| {
        let block = &c[1];
        Datasource {
            provider: first_capture(&PROVIDER_RE, block).unwrap_or_else(|| "unknown".into()),
            url: first_capture(&URL_RE, block)
                .map(|u| u.trim().to_string())
                .unwrap_or_else(|| "unknown".into()),
        }
    });
    let generator = GENERATOR_RE.captures(content).map(|c| {
        first_capture(&PROVIDER_RE, &c[1]).unwrap_or_else(|| "unknown".into())
    });
    let enums: HashSet<&str> = ENUM_RE
        .captures_iter(content)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();

    let models = MODEL_RE
        .captures_iter(content)
        .map(|c| parse_model(&c[1], &c[2], &enums))
        .collect();

    PrismaSchema {
        path,
        datasource,
        generator,
        models,
    }
}

fn parse_model(name: &str, body: &str, enums: &HashSet<&str>) -> PrismaModel {
    let mut model = PrismaModel {
        name: name.to_string(),
        fields: Vec::new(),
        relations: Vec::new(),
    };
    for line in body.lines().map(str::trim) {
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        let Some(c) = FIELD_RE.captures(line) else {
            continue;
        };
        let field_name = c[1].to_string();
        let ty = c[2].to_string();
        let is_array = c.get(3).is_some();
        let is_optional = c.get(4).is_some();
        let attributes = c[5].trim().to_string();

        if PRISMA_SCALARS.contains(&ty.as_str()) || enums.contains(ty.as_str()) {
            model.fields.push(PrismaField {
                name: field_name,
                ty,
                is_optional,
                attributes,
            });
        } else {
            model.relations.push(PrismaRelation {
                name: field_name,
                ty,
                is_array,
                attributes,
            });
        }
    }
    model
}

/// Parse a TypeORM entity's class, table, columns and relations.
pub fn parse_entity(path: String, content: &str) -> TypeOrmEntity {
    TypeOrmEntity {
        path,
        name: first_capture(&CLASS_RE, content).unwrap_or_default(),
        table: first_capture(&ENTITY_RE, content).unwrap_or_default(),
        columns: members(&COLUMN_RE, content),
        relations: members(&RELATION_RE, content),
    }
}

fn members(re: &Regex, content: &str) -> Vec<EntityMember> {
    re.captures_iter(content)
        .map(|c| EntityMember {
            decorator: format!("@{}", &c[1]),
            name: c[2].to_string(),
            ty: c[3].to_string(),
        })
        .collect()
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn render_report(detection: &SchemaDetection) -> String {
    let mut lines: Vec<String> = vec![
        "# Database Model Analysis Report".into(),
        String::new(),
        "## Infrastructure Detection".into(),
        String::new(),
    ];

    if detection.is_empty() {
        lines.extend(
            [
                "**Status:** No database schema infrastructure detected",
                "",
                "### Recommendations:",
                "- Consider setting up Prisma or TypeORM for type-safe database access",
                "- Create a `prisma/schema.prisma` file if using Prisma",
                "- Create `*.entity.ts` files in a dedicated directory if using TypeORM",
            ]
            .map(String::from),
        );
        return lines.join("\n");
    }

    if !detection.prisma.is_empty() {
        lines.push("✅ **Prisma detected**".into());
        lines.push(String::new());
        lines.push(format!("- Found {} schema file(s):", detection.prisma.len()));
        lines.extend(detection.prisma.iter().map(|s| format!("  - `{}`", s.path)));
        lines.push(String::new());

        for schema in &detection.prisma {
            lines.push(format!("### Schema: `{}`", schema.path));
            lines.push(String::new());
            if let Some(ds) = &schema.datasource {
                lines.push(format!("**Datasource:** `{}` (url: `{}`)", ds.provider, ds.url));
                lines.push(String::new());
            }
            if let Some(generator) = &schema.generator {
                lines.push(format!("**Generator:** `{generator}`"));
                lines.push(String::new());
            }
            if schema.models.is_empty() {
                continue;
            }
            lines.push(format!("**Models:** {} defined", schema.models.len()));
            lines.push(String::new());
            for model in &schema.models {
                lines.push(format!("#### Model: `{}`", model.name));
                lines.push(String::new());
                if !model.fields.is_empty() {
                    lines.push("**Fields:**".into());
                    for f in &model.fields {
                        let opt = if f.is_optional { " (optional)" } else { "" };
                        lines.push(
                            format!("- `{}`: `{}`{opt} {}", f.name, f.ty, f.attributes)
                                .trim_end()
                                .to_string(),
                        );
                    }
                    lines.push(String::new());
                }
                if !model.relations.is_empty() {
                    lines.push("**Relations:**".into());
                    for r in &model.relations {
                        let suffix = if r.is_array { "[]" } else { "" };
                        lines.push(
                            format!("- `{}`: `{}{suffix}` {}", r.name, r.ty, r.attributes)
                                .trim_end()
                                .to_string(),
                        );
                    }
                    lines.push(String::new());
                }
            }
        }
    }

    if !detection.typeorm.is_empty() {
        lines.push("✅ **TypeORM detected**".into());
        lines.push(String::new());
        lines.push(format!("- Found {} entity file(s):", detection.typeorm.len()));
        lines.extend(detection.typeorm.iter().map(|e| format!("  - `{}`", e.path)));
        lines.push(String::new());

        for entity in &detection.typeorm {
            lines.push(format!(
                "### Entity: `{}` (table: `{}`)",
                entity.name, entity.table
            ));
            lines.push(format!("**File:** `{}`", entity.path));
            lines.push(String::new());
            for (heading, members) in [("**Columns:**", &entity.columns), ("**Relations:**", &entity.relations)] {
                if members.is_empty() {
                    continue;
                }
                lines.push(heading.into());
                lines.extend(
                    members
                        .iter()
                        .map(|m| format!("- `{}`: `{}` ({})", m.name, m.ty, m.decorator)),
                );
                lines.push(String::new());
            }
        }
    }

    lines.extend(
        [
            "---",
            "",
            "## Suggestions",
            "",
            "- Ensure all models have proper indexes for frequently queried fields",
            "- Consider adding soft delete columns (deletedAt) for audit trails",
            "- Review relation configurations for proper cascade behavior",
            "- Add database migration version control (prisma migrate / typeorm migration)",
        ]
        .map(String::from),
    );
    lines.join("\n")
}
