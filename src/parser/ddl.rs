use super::common::{
    balanced, failure, identifier, non_keyword_identifier, phrase, ws, GrammarError, PResult,
};
use super::scan::split_top_level;
use super::statement::{ColumnDef, Statement};

/// `name` followed by free-form type text; `PRIMARY KEY` anywhere in the
/// type text marks the primary key.
fn column_def(text: &str) -> Result<ColumnDef, GrammarError> {
    let (type_text, name) = ws(identifier)(text)
        .map_err(|_| GrammarError::Mismatch(text.trim().to_string()))?;
    let type_name = type_text.trim().to_string();
    let tokens: Vec<String> = type_name
        .split_whitespace()
        .map(str::to_ascii_uppercase)
        .collect();
    let primary_key = tokens.windows(2).any(|w| w[0] == "PRIMARY" && w[1] == "KEY");

    Ok(ColumnDef {
        name,
        type_name,
        primary_key,
    })
}

pub fn create_table(input: &str) -> PResult<'_, Statement> {
    let (input, _) = ws(phrase("CREATE TABLE"))(input)?;
    let (input, name) = ws(non_keyword_identifier)(input)?;
    let (input, body) = ws(balanced)(input)?;

    let columns = split_top_level(body, ',')
        .into_iter()
        .map(column_def)
        .collect::<Result<Vec<_>, _>>();
    match columns {
        Ok(columns) => Ok((input, Statement::CreateTable { name, columns })),
        Err(e) => failure(e),
    }
}
