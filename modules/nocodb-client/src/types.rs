use serde::Deserialize;

// --- Request parameters ---

/// Projection of a linked (relational) field, sent as `nested[<field>][fields]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedFields {
    pub field: String,
    pub fields: Vec<String>,
}

/// Sort order for a list request. Descending sorts are sent with a `-` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortParam {
    pub field: String,
    pub descending: bool,
}

impl SortParam {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    pub fn to_param(&self) -> String {
        if self.descending {
            format!("-{}", self.field)
        } else {
            self.field.clone()
        }
    }
}

/// Parameters for `GET {base}/{table}`.
///
/// `where_clause` is already in the NocoDB filter grammar, e.g.
/// `(Country,isnot,null)~and(Year,btw,2005,2015)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub limit: u32,
    pub offset: u64,
    pub fields: Vec<String>,
    pub nested: Vec<NestedFields>,
    pub where_clause: Option<String>,
    pub sort: Option<SortParam>,
}

impl ListParams {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn nested<I, S>(mut self, field: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nested.push(NestedFields {
            field: field.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn where_clause(mut self, clause: Option<String>) -> Self {
        self.where_clause = clause.filter(|c| !c.is_empty());
        self
    }

    pub fn sort(mut self, sort: SortParam) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_offset(&self, offset: u64) -> Self {
        Self {
            offset,
            ..self.clone()
        }
    }

    /// Flatten into query-string pairs. Empty projections and filters are omitted.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("limit".to_string(), self.limit.to_string())];

        if self.offset > 0 {
            pairs.push(("offset".to_string(), self.offset.to_string()));
        }
        if !self.fields.is_empty() {
            pairs.push(("fields".to_string(), self.fields.join(",")));
        }
        for nested in &self.nested {
            pairs.push((
                format!("nested[{}][fields]", nested.field),
                nested.fields.join(","),
            ));
        }
        if let Some(ref clause) = self.where_clause {
            pairs.push(("where".to_string(), clause.clone()));
        }
        if let Some(ref sort) = self.sort {
            pairs.push(("sort".to_string(), sort.to_param()));
        }

        pairs
    }
}

// --- Responses ---

/// Pagination metadata returned alongside every list response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageInfo {
    #[serde(rename = "totalRows", default)]
    pub total_rows: u64,
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(rename = "pageSize", default)]
    pub page_size: Option<u64>,
    #[serde(rename = "isFirstPage", default)]
    pub is_first_page: Option<bool>,
    #[serde(rename = "isLastPage", default)]
    pub is_last_page: Option<bool>,
}

/// Wrapper for NocoDB list responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub list: Vec<T>,
    #[serde(rename = "pageInfo", default)]
    pub page_info: PageInfo,
}

/// Number of pages needed to cover `total_rows` at `limit` rows per page.
pub fn page_count(total_rows: u64, limit: u32) -> u64 {
    let limit = u64::from(limit.max(1));
    total_rows.div_ceil(limit)
}
