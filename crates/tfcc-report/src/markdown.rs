//! # Markdown Rendering
//!
//! Renders a [`ComplianceReport`] as a Markdown document with the same
//! sections as the paginated report: a title summary, then per entity a
//! summary, then per workspace a summary followed by passed and failed
//! check tables. Empty name lists and empty tables print `N/A`.

use std::fmt::{self, Write as _};

use tfcc_core::Verdict;

use crate::report::{ComplianceReport, EntityReport, WorkspaceReport};

/// Placeholder for an empty list or table.
pub const EMPTY_PLACEHOLDER: &str = "N/A";

/// Render a report as Markdown.
pub fn render_markdown(report: &ComplianceReport) -> String {
    MarkdownReport(report).to_string()
}

/// `Display` adapter that writes a report as Markdown.
pub struct MarkdownReport<'a>(pub &'a ComplianceReport);

impl fmt::Display for MarkdownReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        writeln!(f, "# Terraform Compliance Report")?;
        writeln!(f)?;
        writeln!(f, "Run: `{}`", report.timestamp())?;
        writeln!(f)?;
        summary_table(
            f,
            &[
                ("Entities Checked", report.checked_entity_count()),
                ("Compliant Entities", report.compliant_entity_count()),
                ("Non-Compliant Entities", report.non_compliant_entity_count()),
            ],
        )?;
        name_list(
            f,
            "Compliant Entity Names",
            report.compliant_entities().iter().map(String::as_str),
        )?;
        name_list(
            f,
            "Non-Compliant Entity Names",
            report.non_compliant_entities().iter().map(String::as_str),
        )?;

        for (name, entity) in report.entities() {
            write_entity(f, name, entity)?;
        }
        Ok(())
    }
}

fn write_entity(f: &mut fmt::Formatter<'_>, name: &str, entity: &EntityReport) -> fmt::Result {
    writeln!(f, "## Entity: {}", escape(name))?;
    writeln!(f)?;
    summary_table(
        f,
        &[
            ("Checked Workspaces", entity.checked_workspaces()),
            ("Compliant Workspaces", entity.compliant_workspaces()),
            ("Non-Compliant Workspaces", entity.non_compliant_workspaces()),
        ],
    )?;
    name_list(f, "Non-Compliant Workspaces", entity.non_compliant_workspace_names().into_iter())?;
    name_list(f, "Compliant Workspaces", entity.compliant_workspace_names().into_iter())?;

    for (workspace_name, workspace) in entity.workspaces() {
        write_workspace(f, workspace_name, workspace)?;
    }
    Ok(())
}

fn write_workspace(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    workspace: &WorkspaceReport,
) -> fmt::Result {
    writeln!(f, "### Workspace: {}", escape(name))?;
    writeln!(f)?;
    summary_table(
        f,
        &[
            ("Performed Checks", workspace.checks()),
            ("Passed Checks", workspace.compliant_check_count()),
            ("Failed Checks", workspace.non_compliant_check_count()),
        ],
    )?;
    checks_table(f, "Passed Checks", workspace.compliant_checks())?;
    checks_table(f, "Failed Checks", workspace.failed_checks())
}

fn summary_table(f: &mut fmt::Formatter<'_>, rows: &[(&str, usize)]) -> fmt::Result {
    writeln!(f, "| | |")?;
    writeln!(f, "|---|---|")?;
    for (label, count) in rows {
        writeln!(f, "| {label} | {count} |")?;
    }
    writeln!(f)
}

fn name_list<'a>(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    names: impl Iterator<Item = &'a str>,
) -> fmt::Result {
    let names: Vec<String> = names.map(escape).collect();
    if names.is_empty() {
        writeln!(f, "**{title}:** {EMPTY_PLACEHOLDER}")?;
    } else {
        writeln!(f, "**{title}:** {}", names.join(", "))?;
    }
    writeln!(f)
}

fn checks_table(f: &mut fmt::Formatter<'_>, title: &str, checks: &[Verdict]) -> fmt::Result {
    writeln!(f, "#### {title}")?;
    writeln!(f)?;
    if checks.is_empty() {
        writeln!(f, "{EMPTY_PLACEHOLDER}")?;
        return writeln!(f);
    }
    writeln!(f, "| Rule Name | Description | Resource Type | Resource ID | Provider | Level |")?;
    writeln!(f, "|---|---|---|---|---|---|")?;
    for check in checks {
        let mut row = String::new();
        for cell in [
            check.rule_name.as_str(),
            check.description.as_str(),
            check.resource_type.as_str(),
            &check.resource_id.to_string(),
            check.provider.as_str(),
            check.compliance_level.label(),
        ] {
            write!(row, "| {} ", escape(cell))?;
        }
        writeln!(f, "{row}|")?;
    }
    writeln!(f)
}

/// Escape characters that would break a table cell.
fn escape(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{fold_entity, fold_report, fold_workspace};
    use tfcc_core::{normalize_provider, ComplianceLevel, ResourceId, RunTimestamp};

    fn verdict(id: &str, status: bool) -> Verdict {
        Verdict {
            rule_name: "s3-no-public-acl".into(),
            description: "Buckets are private | not public".into(),
            compliance_level: ComplianceLevel::SoftMandatory,
            provider: normalize_provider("aws"),
            resource_type: "aws_s3_bucket".into(),
            resource_id: ResourceId::Single(id.into()),
            compliance_status: status,
            errors: vec![],
        }
    }

    fn report(verdicts: Vec<Verdict>) -> ComplianceReport {
        let entity =
            fold_entity("platform", vec![("platform-api".into(), fold_workspace(verdicts))])
                .unwrap();
        fold_report(
            RunTimestamp::parse("2024-03-01-08-30-00").unwrap(),
            vec![("platform".into(), entity)],
        )
        .unwrap()
    }

    #[test]
    fn renders_all_sections() {
        let md = render_markdown(&report(vec![
            verdict("a", true),
            verdict("b", true),
            verdict("c", false),
        ]));
        assert!(md.starts_with("# Terraform Compliance Report"));
        assert!(md.contains("Run: `2024-03-01-08-30-00`"));
        assert!(md.contains("| Entities Checked | 1 |"));
        assert!(md.contains("## Entity: platform"));
        assert!(md.contains("### Workspace: platform-api"));
        assert!(md.contains("| Performed Checks | 3 |"));
        assert!(md.contains(
            "| s3-no-public-acl | Buckets are private \\| not public | aws_s3_bucket | a, b \
             | AWS | Soft Mandatory |"
        ));
        assert!(md.contains("**Non-Compliant Entity Names:** platform"));
    }

    #[test]
    fn empty_lists_render_placeholder() {
        let md = render_markdown(&report(vec![verdict("a", true)]));
        assert!(md.contains("**Non-Compliant Entity Names:** N/A"));
        assert!(md.contains("**Non-Compliant Workspaces:** N/A"));
        assert!(md.contains("#### Failed Checks\n\nN/A\n"));
    }
}
