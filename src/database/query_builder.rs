use sqlx::{
    postgres::{PgArguments, PgRow},
    query::QueryAs,
    FromRow, Postgres,
};

/// A value bound to a `$n` placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Int(i64),
    Text(String),
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        SqlParam::Int(v)
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        SqlParam::Text(v)
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Text(v.to_string())
    }
}

/// Assembles a conjunctive WHERE clause from optional predicates.
///
/// Predicates are rendered in the order they were pushed and every value is
/// bound as a positional parameter, so the same filter always yields the same
/// SQL text.
#[derive(Debug, Default)]
pub struct WhereBuilder {
    clauses: Vec<String>,
    params: Vec<SqlParam>,
}

impl WhereBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a predicate; `clause` receives the placeholder index for `param`.
    pub fn push_with(&mut self, clause: impl FnOnce(usize) -> String, param: impl Into<SqlParam>) {
        self.params.push(param.into());
        self.clauses.push(clause(self.params.len()));
    }

    /// `column = $n`
    pub fn eq(&mut self, column: &str, param: impl Into<SqlParam>) {
        self.push_with(|n| format!("{} = ${}", column, n), param);
    }

    /// `column = $n` when `value` is present
    pub fn eq_opt<P: Into<SqlParam>>(&mut self, column: &str, value: Option<P>) {
        if let Some(v) = value {
            self.eq(column, v);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// ` WHERE a AND b`, or an empty string when nothing was pushed
    pub fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            return String::new();
        }
        format!(" WHERE {}", self.clauses.join(" AND "))
    }

    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }

    /// Bind every collected parameter onto `q` in placeholder order.
    pub fn bind<'q, O>(
        &'q self,
        mut q: QueryAs<'q, Postgres, O, PgArguments>,
    ) -> QueryAs<'q, Postgres, O, PgArguments>
    where
        O: for<'r> FromRow<'r, PgRow>,
    {
        for p in &self.params {
            q = match p {
                SqlParam::Int(i) => q.bind(*i),
                SqlParam::Text(s) => q.bind(s.as_str()),
            };
        }
        q
    }
}

/// ` LIMIT n OFFSET m`, each part only when positive
pub fn limit_offset(limit: i64, offset: i64) -> String {
    let mut sql = String::new();
    if limit > 0 {
        sql.push_str(&format!(" LIMIT {}", limit));
    }
    if offset > 0 {
        sql.push_str(&format!(" OFFSET {}", offset));
    }
    sql
}
