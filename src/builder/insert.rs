//! INSERT assembly and key generation.

use tracing::debug;

use super::{KeyGeneration, MappedStatement, StatementBuilder, StatementKind};
use crate::dialect::GenerationStrategy;
use crate::error::{MappingError, MappingResult};
use crate::metadata::Property;
use crate::script::Fragment;

/// Full-row insert. Identity-generated id columns stay out of the column
/// list; sequence-generated ids are selected before the insert and bound like
/// any other column.
pub(crate) fn build(
    builder: &StatementBuilder,
    entity_name: &str,
) -> MappingResult<MappedStatement> {
    let model = builder.model();
    let entity = model.entity(entity_name)?;
    let dialect = builder.dialect();
    let strategy = model.generation_strategy(entity)?;

    match strategy {
        GenerationStrategy::Identity if !dialect.supports_identity() => {
            return Err(MappingError::UnsupportedGeneration {
                dialect: dialect.name().to_string(),
                strategy: strategy.to_string(),
            });
        }
        GenerationStrategy::Sequence if !dialect.supports_sequences() => {
            return Err(MappingError::UnsupportedGeneration {
                dialect: dialect.name().to_string(),
                strategy: strategy.to_string(),
            });
        }
        _ => {}
    }

    let skip = |p: &Property| {
        p.id && p.generation.is_some() && strategy == GenerationStrategy::Identity
    };
    let mut columns: Vec<(String, Fragment)> = entity
        .properties
        .iter()
        .filter(|p| !skip(p))
        .map(|p| {
            (
                builder.column_ident(&p.column),
                Fragment::Param {
                    name: p.name.clone(),
                    sql_type: Some(p.sql_type),
                    type_handler: p.converter.clone(),
                },
            )
        })
        .collect();
    for fk in super::fk_columns(model, entity)? {
        columns.push((
            builder.column_ident(&fk.column),
            Fragment::typed_param(&fk.param, fk.sql_type),
        ));
    }

    let column_list = columns
        .iter()
        .map(|(c, _)| c.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let mut script = vec![Fragment::Sql(format!(
        "INSERT INTO {} ({column_list}) VALUES (",
        builder.table_sql(entity)
    ))];
    for (i, (_, param)) in columns.into_iter().enumerate() {
        if i > 0 {
            script.push(Fragment::sql(", "));
        }
        script.push(param);
    }
    script.push(Fragment::sql(")"));

    let key_generation = match strategy {
        GenerationStrategy::None => None,
        GenerationStrategy::Identity => entity.id_property().map(|id| KeyGeneration {
            property: id.name.clone(),
            column: id.column.clone(),
            before: false,
            sql: dialect.identity_select().to_string(),
        }),
        GenerationStrategy::Sequence => entity.id_property().map(|id| KeyGeneration {
            property: id.name.clone(),
            column: id.column.clone(),
            before: true,
            sql: dialect.sequence_select(&model.sequence_name(id)),
        }),
    };

    let mut statement = MappedStatement::new(
        format!("{}.insert", entity.name),
        StatementKind::Insert,
        script,
    );
    statement.parameter_type = Some(entity.name.clone());
    statement.key_generation = key_generation;
    debug!(id = %statement.id, strategy = %strategy, "built insert");
    Ok(statement)
}
