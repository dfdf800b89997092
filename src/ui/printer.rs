use crate::reporters::table::ResultTable;
use colored::*;
use std::path::Path;

const RULE: &str = "═══════════════════════════════════════";
const PREVIEW_ROWS: usize = 10;

pub fn print_summary(table: &ResultTable, output: &Path) {
    let summary = table.summary();

    println!("\n{}", RULE.green().bold());
    println!("{}", "fetchbench Run Complete".green().bold());
    println!("{}", RULE.green().bold());

    println!("\n{}", "Summary:".yellow().bold());
    println!("  Total attempts: {}", summary.total.to_string().bold());
    println!("  Successful: {}", summary.success.to_string().green().bold());
    if summary.failure > 0 {
        println!("  Failed: {}", summary.failure.to_string().red().bold());
    } else {
        println!("  Failed: {}", summary.failure);
    }

    let rows = table.records().len();
    if rows > PREVIEW_ROWS {
        println!("\n{} (first {} of {}):", "Results".yellow().bold(), PREVIEW_ROWS, rows);
    } else {
        println!("\n{}:", "Results".yellow().bold());
    }
    println!("{}", table.preview(PREVIEW_ROWS));

    println!("\n{}", format!("Results saved to: {}", output.display()).green().dimmed());
}

/// Echo of a batch script's output line.
pub fn print_script_line(line: &str) {
    println!("{}", line);
}

pub fn print_rule() {
    println!("{}", "=".repeat(70).dimmed());
}
