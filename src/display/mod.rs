//! Output rendering for command results.
//!
//! Every command result renders either as a text table or as JSON. The
//! choice, the column subset (`--format`) and the header toggle
//! (`--no-header`) are all read through the configuration resolver, so they
//! follow the same precedence as any other flag.

use crate::command::namespace::flag_key;
use crate::config::ConfigResolver;
use crate::error::{CliError, CliResult};
use comfy_table::presets::NOTHING;
use comfy_table::Table;
use std::io::Write;

/// Something a command can hand to the displayer.
///
/// Handler futures crossing an await while holding one of these must stay
/// `Send`, so the trait object has to be shareable.
pub trait Displayable: Send + Sync {
    /// Column names in display order.
    fn cols(&self) -> &[&'static str];
    /// One row of cells per item, aligned with [`cols`](Self::cols).
    fn rows(&self) -> Vec<Vec<String>>;
    /// Structured representation for JSON output.
    fn json(&self) -> serde_json::Value;
}

/// Renders a [`Displayable`] according to the resolved output settings.
pub struct Displayer<'a> {
    ns: &'a str,
    config: &'a ConfigResolver,
}

impl<'a> Displayer<'a> {
    /// Displayer for the command namespace `ns`.
    pub fn new(ns: &'a str, config: &'a ConfigResolver) -> Self {
        Self { ns, config }
    }

    /// Render `item` to `out`.
    pub fn render(&self, item: &dyn Displayable, out: &mut dyn Write) -> CliResult<()> {
        let output = self.config.get_str("output")?;
        match output.as_str() {
            "json" => self.render_json(item, out),
            "text" | "" => self.render_text(item, out),
            other => Err(CliError::InvalidArgument(format!(
                "unknown output format {:?}, expected text or json",
                other
            ))),
        }
    }

    fn render_json(&self, item: &dyn Displayable, out: &mut dyn Write) -> CliResult<()> {
        let body = serde_json::to_string_pretty(&item.json())
            .map_err(|e| CliError::InvalidArgument(e.to_string()))?;
        writeln!(out, "{}", body)?;
        Ok(())
    }

    fn render_text(&self, item: &dyn Displayable, out: &mut dyn Write) -> CliResult<()> {
        let cols = item.cols();
        let selected = self.selected_columns(cols)?;
        let no_header = self
            .config
            .get_bool(&flag_key(self.ns, "no-header"))
            .unwrap_or(false);

        let mut table = Table::new();
        table.load_preset(NOTHING);

        if !no_header {
            table.set_header(selected.iter().map(|&i| cols[i]));
        }
        for row in item.rows() {
            table.add_row(selected.iter().map(|&i| row.get(i).cloned().unwrap_or_default()));
        }

        writeln!(out, "{}", table)?;
        Ok(())
    }

    // Indices of the columns to show: all of them, or the subset named by
    // the command's format flag. Unknown names are ignored.
    fn selected_columns(&self, cols: &[&'static str]) -> CliResult<Vec<usize>> {
        let format = self
            .config
            .get_str(&flag_key(self.ns, "format"))
            .unwrap_or_default();
        if format.is_empty() {
            return Ok((0..cols.len()).collect());
        }

        let selected: Vec<usize> = format
            .split(',')
            .filter_map(|name| {
                let name = name.trim();
                cols.iter().position(|c| c.eq_ignore_ascii_case(name))
            })
            .collect();

        if selected.is_empty() {
            return Err(CliError::InvalidArgument(format!(
                "no valid columns in format {:?}, possible values: {}",
                format,
                cols.join(",")
            )));
        }
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigValue, ValueSource};

    struct Pair;

    impl Displayable for Pair {
        fn cols(&self) -> &[&'static str] {
            &["ID", "Name", "Region"]
        }

        fn rows(&self) -> Vec<Vec<String>> {
            vec![
                vec!["1".into(), "web-1".into(), "fra1".into()],
                vec!["2".into(), "web-2".into(), "ams2".into()],
            ]
        }

        fn json(&self) -> serde_json::Value {
            serde_json::json!([{"id": 1, "name": "web-1"}, {"id": 2, "name": "web-2"}])
        }
    }

    fn render_with(config: &ConfigResolver) -> String {
        let displayer = Displayer::new("nimbus.server.list", config);
        let mut out = Vec::new();
        displayer.render(&Pair, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_trait_object_is_send_and_sync() {
        fn assert_shareable<T: ?Sized + Send + Sync>() {}
        assert_shareable::<dyn Displayable>();
    }

    #[test]
    fn test_text_output_with_header() {
        let config = ConfigResolver::new();
        let text = render_with(&config);
        assert!(text.contains("ID"));
        assert!(text.contains("web-1"));
        assert!(text.contains("ams2"));
    }

    #[test]
    fn test_format_selects_column_subset() {
        let mut config = ConfigResolver::new();
        config.bind(
            "nimbus.server.list.format",
            ValueSource::Flag,
            ConfigValue::Str("Name,bogus".into()),
        );
        let text = render_with(&config);
        assert!(text.contains("web-1"));
        assert!(!text.contains("fra1"));
        assert!(!text.contains("ID"));
    }

    #[test]
    fn test_no_header_drops_header_row() {
        let mut config = ConfigResolver::new();
        config.bind(
            "nimbus.server.list.no-header",
            ValueSource::Flag,
            ConfigValue::Bool(true),
        );
        let text = render_with(&config);
        assert!(!text.contains("Region"));
        assert!(text.contains("fra1"));
    }

    #[test]
    fn test_json_output() {
        let mut config = ConfigResolver::new();
        config.bind("output", ValueSource::Flag, ConfigValue::Str("json".into()));
        let text = render_with(&config);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["name"], "web-1");
    }

    #[test]
    fn test_unknown_output_format_is_rejected() {
        let mut config = ConfigResolver::new();
        config.bind("output", ValueSource::Flag, ConfigValue::Str("yaml".into()));
        let displayer = Displayer::new("nimbus.server.list", &config);
        let mut out = Vec::new();
        assert!(displayer.render(&Pair, &mut out).is_err());
    }

    #[test]
    fn test_all_format_columns_unknown_is_an_error() {
        let mut config = ConfigResolver::new();
        config.bind(
            "nimbus.server.list.format",
            ValueSource::Flag,
            ConfigValue::Str("bogus".into()),
        );
        let displayer = Displayer::new("nimbus.server.list", &config);
        let mut out = Vec::new();
        assert!(displayer.render(&Pair, &mut out).is_err());
    }
}
