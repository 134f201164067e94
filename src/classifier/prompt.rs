//! System instruction built from the taxonomy.

use crate::taxonomy::Taxonomy;

/// Render the instruction that lists every category with its description,
/// followed by the subcategories allowed for each category.
pub fn build_system_prompt(taxonomy: &Taxonomy) -> String {
    let categories_fmt = taxonomy
        .categories()
        .map(|c| format!(" * {}: {}", c.name, c.description))
        .collect::<Vec<_>>()
        .join("\n");

    let subcats_fmt = taxonomy
        .categories()
        .map(|c| {
            let bullets = c
                .subcategories
                .iter()
                .map(|sub| format!("       • {}", sub))
                .collect::<Vec<_>>()
                .join("\n");
            format!("   - {}:\n{}", c.name, bullets)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"
You will be given a text block from a legal document.

First, choose the best fitting **category** from the list below,
using the description provided for each:

{categories_fmt}

Then, choose the best fitting **subcategory** from the list for that category:

{subcats_fmt}

Respond with a JSON object containing exactly two keys:
  {{ "category": "<Category>", "subcategory": "<Subcategory>" }}
where <Category> must be one of the keys above, and <Subcategory> must be one of the entries under that category.
"#
    )
}
