//! DataFrame column-extraction helpers shared by the chart and report layers.

use polars::prelude::*;

/// Extract a column as f64 values, dropping nulls.
pub fn column_f64(df: &DataFrame, name: &str) -> PolarsResult<Vec<f64>> {
    let values = df.column(name)?.cast(&DataType::Float64)?;
    Ok(values.f64()?.into_iter().flatten().collect())
}

/// Extract a string column, dropping nulls.
pub fn column_str(df: &DataFrame, name: &str) -> PolarsResult<Vec<String>> {
    Ok(df
        .column(name)?
        .str()?
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect())
}

/// Extract two columns as aligned (x, y) pairs, dropping rows where either
/// value is null.
pub fn xy_pairs(df: &DataFrame, x: &str, y: &str) -> PolarsResult<Vec<(f64, f64)>> {
    let xs = df.column(x)?.cast(&DataType::Float64)?;
    let ys = df.column(y)?.cast(&DataType::Float64)?;
    Ok(xs
        .f64()?
        .into_iter()
        .zip(ys.f64()?)
        .filter_map(|(a, b)| Some((a?, b?)))
        .collect())
}

/// Unique values of a string column, sorted.
pub fn unique_str(df: &DataFrame, name: &str) -> PolarsResult<Vec<String>> {
    let unique = df.column(name)?.unique()?;
    let mut values: Vec<String> = unique
        .as_materialized_series()
        .str()?
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();
    values.sort();
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_skip_rows_with_nulls() {
        let df = df!(
            "x" => [Some(1.0), None, Some(3.0)],
            "y" => [Some(10.0), Some(20.0), None],
        )
        .unwrap();
        assert_eq!(xy_pairs(&df, "x", "y").unwrap(), vec![(1.0, 10.0)]);
    }

    #[test]
    fn integer_columns_are_cast() {
        let df = df!("year" => [2005, 2019]).unwrap();
        assert_eq!(column_f64(&df, "year").unwrap(), vec![2005.0, 2019.0]);
    }

    #[test]
    fn unique_values_are_sorted() {
        let df = df!("region" => ["Wales", "London", "Wales"]).unwrap();
        assert_eq!(
            unique_str(&df, "region").unwrap(),
            vec!["London".to_string(), "Wales".to_string()]
        );
    }
}
