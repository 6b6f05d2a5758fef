//! Text presentation of the controller state
//!
//! Pure functions of the controller: they read the collection, selection and
//! error, and never mutate anything.

pub mod form;
pub mod list_item;

use colored::Colorize;

use crate::state::MaterialsController;

pub use form::FormView;
pub use list_item::{parse_hex_color, render_list_item, swatch};

pub const EMPTY_LIST_TEXT: &str = "No Materials";

pub fn render_buttons(controller: &MaterialsController) -> String {
    let add = "[+ Add]".green();
    let delete = if controller.selected_id().is_some() {
        "[x Delete]".red()
    } else {
        "[x Delete]".dimmed()
    };
    format!("{} {}", add, delete)
}

pub fn render_list(controller: &MaterialsController) -> String {
    let collection = controller.collection();
    if collection.is_empty() {
        return format!("  {}", EMPTY_LIST_TEXT.italic());
    }

    let selected = controller.selected_id();
    collection
        .iter()
        .enumerate()
        .map(|(i, material)| {
            format!(
                "{:>3}. {}",
                i + 1,
                render_list_item(material, selected == Some(&material.id))
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_total(controller: &MaterialsController) -> String {
    format!("Total Cost: ${}", controller.total_cost())
}

pub fn render_error(controller: &MaterialsController) -> Option<String> {
    controller
        .last_error()
        .map(|message| message.red().to_string())
}

/// Whole screen: title, buttons, list, form, total and error line
pub fn render_materials(controller: &MaterialsController) -> String {
    let mut sections = vec![
        "Materials".bold().to_string(),
        render_buttons(controller),
        render_list(controller),
    ];

    if let Some(material) = controller.selected() {
        sections.push(FormView::from(material).render());
    }

    sections.push(render_total(controller));
    if let Some(error) = render_error(controller) {
        sections.push(error);
    }

    sections.join("\n\n")
}
