//! Note rendering.
//!
//! Turns stack files into note text: template substitution, the compose
//! fenced-block rule shared with the synchronizer, `{{date}}` formatting and
//! note file names.

mod date_format;
pub mod fenced_block;
mod filename;
mod template_renderer;

pub use date_format::{DEFAULT_DATE_FORMAT, format_date, render_date_placeholders};
pub use filename::{NOTE_EXTENSION, capitalize_stack_name, generate_file_name, generate_file_name_at};
pub use template_renderer::{DESCRIPTION_PLACEHOLDER, DescriptionSource, TemplateRenderer};
