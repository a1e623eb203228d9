//! Inline update scripts for notebook display surfaces
//!
//! Only the script text is produced here; handing it to a live page is up to
//! the caller.

use dv_core::Model;

use crate::DataError;

/// Render the script that replaces the attributes of `model` on a live page
pub fn update_script(model: &dyn Model) -> Result<String, DataError> {
    let json = serde_json::to_string(&model.attributes()?)?;
    Ok(format!(
        r"
    var ds = Bokeh.Collections('{model}').get('{id}');
    var data = {json};
    ds.set(data);
",
        model = model.type_name(),
        id = model.id(),
        json = json,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::ColumnDataSource;
    use serde_json::json;

    #[test]
    fn test_script_embeds_ref_and_snapshot() {
        let source = ColumnDataSource::from_json(json!({"x": [1, 2]})).unwrap();
        let script = update_script(&source).unwrap();

        assert!(script.contains("Bokeh.Collections('ColumnDataSource')"));
        assert!(script.contains(&format!(".get('{}')", source.id())));
        assert!(script.contains(r#""data":{"x":[1,2]}"#));
        assert!(script.starts_with("\n    var ds = Bokeh.Collections("));
        assert_eq!(script.lines().count(), 4);
        assert!(script.trim_end().ends_with("ds.set(data);"));
    }

    #[test]
    fn test_column_data_source_shortcut() {
        let source = ColumnDataSource::empty();
        assert_eq!(source.notebook_script().unwrap(), update_script(&source).unwrap());
    }
}
