//! Templates command - list saved column-mapping templates

use anyhow::Result;

use super::get_context;
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let templates = &ctx.config.mapping_templates;

    if json {
        println!("{}", serde_json::to_string_pretty(templates)?);
        return Ok(());
    }

    if templates.is_empty() {
        println!("No saved templates.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Headers", "Date", "Description", "Amount", "Category"]);

    let mut signatures: Vec<&String> = templates.keys().collect();
    signatures.sort();

    for signature in signatures {
        let mapping = &templates[signature];
        table.add_row(vec![
            signature.clone(),
            mapping.date.clone().unwrap_or_else(|| "-".to_string()),
            mapping
                .description
                .clone()
                .unwrap_or_else(|| "-".to_string()),
            mapping.amount.clone().unwrap_or_else(|| "-".to_string()),
            mapping.category.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }

    println!("{}", table);
    Ok(())
}
