//! `playbook create-prototype`: copy the current prototype into a sibling
//! directory as the starting point for a new one.

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;

pub struct Template {
    pub name: &'static str,
    pub description: &'static str,
    pub files: &'static [&'static str],
}

pub const TEMPLATES: &[Template] = &[
    Template {
        name: "wizard-flow",
        description: "Multi-step wizard interface (like Cortex Search setup)",
        files: &["wizard-shell", "form-components", "navigation"],
    },
    Template {
        name: "data-explorer",
        description: "Data browsing and filtering interface",
        files: &["data-table", "filters", "search"],
    },
    Template {
        name: "service-dashboard",
        description: "Service management and monitoring dashboard",
        files: &["service-cards", "status-indicators", "metrics"],
    },
    Template {
        name: "analytics-view",
        description: "Charts, metrics, and reporting interface",
        files: &["charts", "metrics-cards", "date-pickers"],
    },
];

pub const DEFAULT_TEMPLATE: &str = "wizard-flow";

/// The scaffolding script shipped with the prototype; never copied.
const SCAFFOLD_SCRIPT: &str = "scripts/create-prototype.js";

/// Directories pruned from the walk.
const SKIPPED_DIRS: &[&str] = &["node_modules", ".git", "target"];

pub fn find_template(name: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.name == name)
}

/// What was created.
#[derive(Debug)]
pub struct Scaffolded {
    pub target: PathBuf,
    pub files_copied: usize,
    pub package_json_updated: bool,
}

/// Copy `source_dir` to `<parent of source_dir>/<name>` and specialise it
/// for `template`.
pub fn create_prototype(
    source_dir: &Path,
    name: &str,
    template_name: &str,
    extra_excludes: &[String],
) -> Result<Scaffolded> {
    let Some(template) = find_template(template_name) else {
        bail!(
            "Unknown template: {}. Available templates: {}",
            template_name,
            TEMPLATES.iter().map(|t| t.name).collect::<Vec<_>>().join(", ")
        );
    };
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        bail!("Invalid prototype name: '{}'", name);
    }

    let source = std::fs::canonicalize(source_dir)
        .with_context(|| format!("Failed to resolve {}", source_dir.display()))?;
    let parent = source
        .parent()
        .context("Cannot create a sibling of the filesystem root")?;
    let target = parent.join(name);
    if target.exists() {
        bail!("Directory {} already exists!", name);
    }

    let mut excludes = vec![
        "**/.git/**".to_string(),
        "**/target/**".to_string(),
        "**/node_modules/**".to_string(),
        SCAFFOLD_SCRIPT.to_string(),
    ];
    excludes.extend(extra_excludes.iter().cloned());
    let exclude_set = build_globset(&excludes)?;

    std::fs::create_dir_all(&target)
        .with_context(|| format!("Failed to create {}", target.display()))?;

    let mut files_copied = 0;
    let walker = WalkDir::new(&source).into_iter().filter_entry(|e| {
        !(e.file_type().is_dir()
            && e.depth() > 0
            && SKIPPED_DIRS
                .iter()
                .any(|d| e.file_name().to_str() == Some(*d)))
    });
    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        let relative = path.strip_prefix(&source).unwrap_or(path);
        if relative.as_os_str().is_empty() {
            continue;
        }
        let rel_str = relative.to_string_lossy().replace('\\', "/");
        let dest = target.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dest)
                .with_context(|| format!("Failed to create {}", dest.display()))?;
            continue;
        }
        if exclude_set.is_match(&rel_str) {
            continue;
        }
        if let Some(dir) = dest.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::copy(path, &dest)
            .with_context(|| format!("Failed to copy {}", rel_str))?;
        files_copied += 1;
    }

    let package_json_updated = rewrite_package_json(&target, name, template)?;
    write_template_readme(&target, template)?;

    Ok(Scaffolded {
        target,
        files_copied,
        package_json_updated,
    })
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

/// Rename the package and describe it by its template. Key order is kept.
/// Returns false when the copy has no `package.json`.
fn rewrite_package_json(target: &Path, name: &str, template: &Template) -> Result<bool> {
    let path = target.join("package.json");
    if !path.exists() {
        return Ok(false);
    }
    let raw = std::fs::read_to_string(&path)?;
    let mut package: serde_json::Value =
        serde_json::from_str(&raw).context("package.json is not valid JSON")?;
    let Some(fields) = package.as_object_mut() else {
        bail!("package.json is not a JSON object");
    };
    fields.remove("template");
    fields.insert("name".to_string(), serde_json::Value::from(name));
    fields.insert(
        "description".to_string(),
        serde_json::Value::from(format!("{} prototype", template.description)),
    );
    std::fs::write(&path, serde_json::to_string_pretty(&package)?)?;
    Ok(true)
}

pub fn template_readme(template: &Template) -> String {
    let files: Vec<String> = template.files.iter().map(|f| format!("- {}", f)).collect();
    format!(
        "# Generated Components for {name}\n\n\
         This directory contains components specific to the {name} template.\n\n\
         Template includes:\n\
         {files}\n\n\
         These components are built on top of the core components in /core/components/\n",
        name = template.name,
        files = files.join("\n")
    )
}

fn write_template_readme(target: &Path, template: &Template) -> Result<()> {
    let dir = target.join("src").join("components").join("generated");
    std::fs::create_dir_all(&dir)?;
    std::fs::write(dir.join("README.md"), template_readme(template))?;
    Ok(())
}

pub fn run_create_prototype(config: &Config, name: &str, template: Option<&str>) -> Result<()> {
    let template = template.unwrap_or(DEFAULT_TEMPLATE);
    let cwd = std::env::current_dir()?;

    println!("Creating prototype: {}", name);
    println!("Using template: {}", template);

    let done = create_prototype(&cwd, name, template, &config.prototype.exclude_globs)?;

    println!("Target directory: {}", done.target.display());
    println!("Copied {} files", done.files_copied);
    if !done.package_json_updated {
        println!("No package.json found; skipped renaming the package");
    }
    println!("Generated template notes in src/components/generated/");
    println!();
    println!("Prototype \"{}\" created successfully!", name);
    println!();
    println!("Next steps:");
    println!("  cd ../{}", name);
    println!("  npm install");
    println!("  npm run dev");
    Ok(())
}

pub fn run_templates() {
    println!("Available templates:");
    for t in TEMPLATES {
        println!("  {:<16} - {}", t.name, t.description);
    }
}
