//! Container contents grammar: `ID[:COUNT]` entries separated by `,` `.` or `;`

use vobforge_core::{ForgeError, Result};
use vobforge_scene::ItemStack;

const SEPARATORS: [char; 3] = [',', '.', ';'];

pub fn parse_container_contents(contents: &str) -> Result<Vec<ItemStack>> {
    let mut items = Vec::new();
    for entry in contents.split(SEPARATORS) {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        let mut parts = entry.split(':');
        let id = parts.next().unwrap_or_default().trim();
        if id.is_empty() {
            return Err(ForgeError::ParseError(format!("Item without id: '{}'", entry)));
        }
        let count = match parts.next() {
            Some(count) => count.trim().parse::<u32>().map_err(|e| {
                ForgeError::ParseError(format!("Invalid count in '{}': {}", entry, e))
            })?,
            None => 1,
        };

        items.push(ItemStack {
            id: id.to_string(),
            count,
        });
    }
    Ok(items)
}
