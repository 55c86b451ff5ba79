//! Recent command - show recently imported transactions

use anyhow::Result;

use super::get_context;
use crate::output;

pub fn run(user: &str, limit: usize, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let records = ctx.store.list_recent(user, limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No transactions yet.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Date", "Description", "Amount", "Category", "Type"]);

    for record in &records {
        table.add_row(vec![
            record.date.to_string(),
            record.description.clone(),
            record.amount.to_string(),
            record.category.clone(),
            record.kind.as_str().to_string(),
        ]);
    }

    println!("{}", table);
    Ok(())
}
