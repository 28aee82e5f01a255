//! Templated-SQL fragment representation.
//!
//! Statement builders assemble a tree of [`Fragment`]s instead of pasting
//! template markup into strings; [`render`] then emits the concrete wire
//! syntax the downstream execution engine consumes: `#{name,jdbcType=T}`
//! placeholders, `<if test="...">`, `<foreach>`, `<bind>` and
//! `<choose>/<when>/<otherwise>` blocks. The markup must round-trip bit-exact
//! through that engine, so all quoting here is deliberate and fixed.

use serde::{Deserialize, Serialize};

use crate::metadata::SqlType;

/// One node of a statement template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fragment {
    /// Literal SQL text, emitted verbatim.
    Sql(String),
    /// A bound parameter placeholder.
    Param {
        name: String,
        sql_type: Option<SqlType>,
        type_handler: Option<String>,
    },
    /// Body emitted only when the runtime expression holds.
    If { test: String, body: Vec<Fragment> },
    /// Iteration over a collection-valued parameter.
    Foreach {
        collection: String,
        item: String,
        open: String,
        separator: String,
        close: String,
        body: Vec<Fragment>,
    },
    /// Bind a derived value to a name for the rest of the template.
    Bind { name: String, value: String },
    /// First matching branch wins; the otherwise branch is the fallback.
    Choose {
        whens: Vec<(String, Vec<Fragment>)>,
        otherwise: Option<Vec<Fragment>>,
    },
}

impl Fragment {
    pub fn sql(text: impl Into<String>) -> Self {
        Fragment::Sql(text.into())
    }

    pub fn param(name: impl Into<String>) -> Self {
        Fragment::Param {
            name: name.into(),
            sql_type: None,
            type_handler: None,
        }
    }

    pub fn typed_param(name: impl Into<String>, sql_type: SqlType) -> Self {
        Fragment::Param {
            name: name.into(),
            sql_type: Some(sql_type),
            type_handler: None,
        }
    }
}

/// Render a fragment list to the engine's template syntax.
pub fn render(fragments: &[Fragment]) -> String {
    let mut out = String::new();
    for fragment in fragments {
        render_one(fragment, &mut out);
    }
    out
}

fn render_one(fragment: &Fragment, out: &mut String) {
    match fragment {
        Fragment::Sql(text) => out.push_str(text),
        Fragment::Param {
            name,
            sql_type,
            type_handler,
        } => {
            out.push_str("#{");
            out.push_str(name);
            if let Some(t) = sql_type {
                if *t != SqlType::Other {
                    out.push_str(",jdbcType=");
                    out.push_str(t.type_name());
                }
            }
            if let Some(handler) = type_handler {
                out.push_str(",typeHandler=");
                out.push_str(handler);
            }
            out.push('}');
        }
        Fragment::If { test, body } => {
            out.push_str("<if test=\"");
            out.push_str(test);
            out.push_str("\">");
            for f in body {
                render_one(f, out);
            }
            out.push_str("</if>");
        }
        Fragment::Foreach {
            collection,
            item,
            open,
            separator,
            close,
            body,
        } => {
            out.push_str("<foreach collection=\"");
            out.push_str(collection);
            out.push_str("\" item=\"");
            out.push_str(item);
            out.push_str("\" open=\"");
            out.push_str(open);
            out.push_str("\" separator=\"");
            out.push_str(separator);
            out.push_str("\" close=\"");
            out.push_str(close);
            out.push_str("\">");
            for f in body {
                render_one(f, out);
            }
            out.push_str("</foreach>");
        }
        Fragment::Bind { name, value } => {
            out.push_str("<bind name=\"");
            out.push_str(name);
            out.push_str("\" value=\"");
            out.push_str(value);
            out.push_str("\"/>");
        }
        Fragment::Choose { whens, otherwise } => {
            out.push_str("<choose>");
            for (test, body) in whens {
                out.push_str("<when test=\"");
                out.push_str(test);
                out.push_str("\">");
                for f in body {
                    render_one(f, out);
                }
                out.push_str("</when>");
            }
            if let Some(body) = otherwise {
                out.push_str("<otherwise>");
                for f in body {
                    render_one(f, out);
                }
                out.push_str("</otherwise>");
            }
            out.push_str("</choose>");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_param_rendering() {
        assert_eq!(render(&[Fragment::param("p0")]), "#{p0}");
        assert_eq!(
            render(&[Fragment::typed_param("p0", SqlType::Varchar)]),
            "#{p0,jdbcType=VARCHAR}"
        );
        assert_eq!(
            render(&[Fragment::Param {
                name: "p0".into(),
                sql_type: Some(SqlType::Varchar),
                type_handler: Some("app.JsonHandler".into()),
            }]),
            "#{p0,jdbcType=VARCHAR,typeHandler=app.JsonHandler}"
        );
        // OTHER carries no useful hint.
        assert_eq!(
            render(&[Fragment::typed_param("p0", SqlType::Other)]),
            "#{p0}"
        );
    }

    #[test]
    fn test_if_and_bind() {
        let fragments = [
            Fragment::Bind {
                name: "pattern".into(),
                value: "name + '%'".into(),
            },
            Fragment::If {
                test: "name != null".into(),
                body: vec![Fragment::sql("name = "), Fragment::param("name")],
            },
        ];
        assert_eq!(
            render(&fragments),
            "<bind name=\"pattern\" value=\"name + '%'\"/>\
             <if test=\"name != null\">name = #{name}</if>"
        );
    }

    #[test]
    fn test_foreach_placeholder_list() {
        let fragment = Fragment::Foreach {
            collection: "p0".into(),
            item: "p0_item".into(),
            open: "(".into(),
            separator: ",".into(),
            close: ")".into(),
            body: vec![Fragment::param("p0_item")],
        };
        assert_eq!(
            render(&[fragment]),
            "<foreach collection=\"p0\" item=\"p0_item\" open=\"(\" separator=\",\" close=\")\">#{p0_item}</foreach>"
        );
    }

    #[test]
    fn test_choose_with_otherwise() {
        let fragment = Fragment::Choose {
            whens: vec![(
                "p0 != null and !p0.isEmpty()".into(),
                vec![Fragment::sql("name IN ...")],
            )],
            otherwise: Some(vec![Fragment::sql("1=0")]),
        };
        assert_eq!(
            render(&[fragment]),
            "<choose><when test=\"p0 != null and !p0.isEmpty()\">name IN ...</when>\
             <otherwise>1=0</otherwise></choose>"
        );
    }
}
