//! New command handler

use anyhow::Result;

use lista_core::List;

use crate::output::Output;

/// Mint a new list or template record locally and print it
pub fn create(title: String, template: bool, output: &Output) -> Result<()> {
    let list = if template {
        List::new_template(title)
    } else {
        List::new(title)
    };

    output.print_list(&list);
    Ok(())
}
