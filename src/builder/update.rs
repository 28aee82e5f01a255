//! UPDATE assembly.

use super::{MappedStatement, StatementBuilder, StatementKind};
use crate::error::{MappingError, MappingResult};
use crate::metadata::Property;
use crate::script::Fragment;

/// Update by id. Partial updates wrap each assignment in a null check; the
/// version column (or, failing that, an id self-assignment) stays
/// unconditional at the end so the conditional assignments can carry their
/// trailing commas.
pub(crate) fn build(
    builder: &StatementBuilder,
    entity_name: &str,
    partial: bool,
) -> MappingResult<MappedStatement> {
    let model = builder.model();
    let entity = model.entity(entity_name)?;
    if entity.id_properties.is_empty() {
        return Err(MappingError::MissingId(entity.name.clone()));
    }
    let version = entity.version_property();

    let settable = |p: &&Property| !p.id && !p.version && p.updatable;
    let mut script = vec![Fragment::Sql(format!(
        "UPDATE {} SET ",
        builder.table_sql(entity)
    ))];

    for p in entity.properties.iter().filter(settable) {
        let column = builder.column_ident(&p.column);
        if partial {
            script.push(Fragment::If {
                test: format!("{} != null", p.name),
                body: vec![
                    Fragment::Sql(format!("{column} = ")),
                    assignment_param(p),
                    Fragment::sql(", "),
                ],
            });
        } else {
            script.push(Fragment::Sql(format!("{column} = ")));
            script.push(assignment_param(p));
            script.push(Fragment::sql(", "));
        }
    }

    for fk in super::fk_columns(model, entity)? {
        let column = builder.column_ident(&fk.column);
        if partial {
            let root = fk.param.split('.').next().unwrap_or(&fk.param);
            script.push(Fragment::If {
                test: format!("{root} != null"),
                body: vec![
                    Fragment::Sql(format!("{column} = ")),
                    Fragment::typed_param(&fk.param, fk.sql_type),
                    Fragment::sql(", "),
                ],
            });
        } else {
            script.push(Fragment::Sql(format!("{column} = ")));
            script.push(Fragment::typed_param(&fk.param, fk.sql_type));
            script.push(Fragment::sql(", "));
        }
    }

    // Unconditional tail absorbing the trailing comma.
    match version {
        Some(v) => {
            let column = builder.column_ident(&v.column);
            script.push(Fragment::Sql(format!("{column} = {column} + 1")));
        }
        None => {
            let id = first_id(entity)?;
            let column = builder.column_ident(&id.column);
            script.push(Fragment::Sql(format!("{column} = {column}")));
        }
    }

    script.push(Fragment::sql(" WHERE "));
    for (i, idx) in entity.id_properties.iter().enumerate() {
        let id = entity
            .properties
            .get(*idx)
            .ok_or_else(|| MappingError::MissingId(entity.name.clone()))?;
        if i > 0 {
            script.push(Fragment::sql(" AND "));
        }
        script.push(Fragment::Sql(format!(
            "{} = ",
            builder.column_ident(&id.column)
        )));
        script.push(Fragment::typed_param(&id.name, id.sql_type));
    }
    if let Some(v) = version {
        script.push(Fragment::Sql(format!(
            " AND {} = ",
            builder.column_ident(&v.column)
        )));
        script.push(Fragment::typed_param(&v.name, v.sql_type));
    }

    let id = if partial {
        format!("{}.updateByIdSelective", entity.name)
    } else {
        format!("{}.updateById", entity.name)
    };
    let mut statement = MappedStatement::new(id, StatementKind::Update, script);
    statement.parameter_type = Some(entity.name.clone());
    Ok(statement)
}

fn assignment_param(p: &Property) -> Fragment {
    Fragment::Param {
        name: p.name.clone(),
        sql_type: Some(p.sql_type),
        type_handler: p.converter.clone(),
    }
}

fn first_id<'a>(entity: &'a crate::metadata::Entity) -> MappingResult<&'a Property> {
    entity
        .id_properties
        .first()
        .and_then(|idx| entity.properties.get(*idx))
        .ok_or_else(|| MappingError::MissingId(entity.name.clone()))
}
