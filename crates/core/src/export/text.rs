//! Human-readable text report, suitable for copying to the clipboard.
//!
//! Layout is fixed: header, then `SCENES`, `CAPTIONS` and `ANIMATIONS`
//! sections in that order, each separated by a rule. Section headers are
//! always printed, even with no entries. Entries are numbered from 1. A
//! `TRANSITIONS` section follows only when the plan has transitions.
//! Free-text fields are written on a single line.

use std::fmt;

use chrono::SecondsFormat;

use crate::plan::EditPlan;

const RULE_WIDTH: usize = 50;

/// Render the report for `plan`.
///
/// The output depends only on the plan (the "Generated" line uses
/// `created_at`), so exporting the same plan twice yields identical text.
pub fn render(plan: &EditPlan) -> String {
    TextReport(plan).to_string()
}

/// [`Display`](fmt::Display) adapter writing the text report.
pub struct TextReport<'a>(pub &'a EditPlan);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plan = self.0;
        writeln!(f, "EDIT PLAN: {}", OneLine(&plan.title))?;
        writeln!(
            f,
            "Generated: {}",
            plan.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        )?;

        write_rule(f)?;
        writeln!(f, "SCENES:")?;
        for (i, scene) in plan.scenes.iter().enumerate() {
            writeln!(f, "{}. {} → {}", i + 1, scene.start_time, scene.end_time)?;
            writeln!(f, "   Action: {}", scene.action)?;
            if let Some(reason) = &scene.reason {
                writeln!(f, "   Reason: {}", OneLine(reason))?;
            }
        }

        write_rule(f)?;
        writeln!(f, "CAPTIONS:")?;
        for (i, caption) in plan.captions.iter().enumerate() {
            writeln!(f, "{}. [{}] {}", i + 1, caption.time, OneLine(&caption.text))?;
            writeln!(
                f,
                "   Style: {} | Duration: {}",
                OneLine(&caption.style),
                caption.duration
            )?;
        }

        write_rule(f)?;
        writeln!(f, "ANIMATIONS:")?;
        for (i, anim) in plan.animations.iter().enumerate() {
            writeln!(f, "{}. {}", i + 1, OneLine(&anim.kind))?;
            writeln!(
                f,
                "   Duration: {} | Timing: {}",
                anim.duration,
                OneLine(&anim.timing)
            )?;
        }

        let transitions = plan.transitions();
        if !transitions.is_empty() {
            write_rule(f)?;
            writeln!(f, "TRANSITIONS:")?;
            for (i, transition) in transitions.iter().enumerate() {
                writeln!(f, "{}. {}", i + 1, OneLine(&transition.kind))?;
                writeln!(f, "   Duration: {}", transition.duration)?;
            }
        }
        Ok(())
    }
}

fn write_rule(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "\n{}\n\n", "=".repeat(RULE_WIDTH))
}

/// Writes a field with line breaks replaced by spaces.
struct OneLine<'a>(&'a str);

impl fmt::Display for OneLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, piece) in self.0.split(['\r', '\n', '\u{2028}', '\u{2029}']).enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(piece)?;
        }
        Ok(())
    }
}
