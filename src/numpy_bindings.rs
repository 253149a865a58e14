use numpy::{Element, IntoPyArray, PyArray1, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use crate::cluster::{check_sorted, cluster_with_settings};
use crate::error::Error;
use crate::merge::deduplicate;
use crate::settings::ClusterSettings;
use crate::sorts::{self, LinkColumns};

impl From<Error> for PyErr {
    fn from(err: Error) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

type LinkArrays = (
    Py<PyArray1<i32>>,
    Py<PyArray1<i64>>,
    Py<PyArray1<i64>>,
    Py<PyArray1<bool>>,
    Py<PyArray1<i32>>,
    Py<PyArray1<i64>>,
    Py<PyArray1<i64>>,
    Py<PyArray1<bool>>,
    Py<PyArray1<u32>>,
    Py<PyArray1<u32>>,
);

fn to_py<T: Element>(py: Python, values: Vec<T>) -> Py<PyArray1<T>> {
    values.into_pyarray(py).unbind()
}

fn into_arrays(py: Python, cols: LinkColumns) -> LinkArrays {
    (
        to_py(py, cols.left_chrs),
        to_py(py, cols.left_starts),
        to_py(py, cols.left_ends),
        to_py(py, cols.left_strands),
        to_py(py, cols.right_chrs),
        to_py(py, cols.right_starts),
        to_py(py, cols.right_ends),
        to_py(py, cols.right_strands),
        to_py(py, cols.split_counts),
        to_py(py, cols.pair_counts),
    )
}

#[pyfunction]
#[pyo3(signature = (
    left_chrs,
    left_starts,
    left_ends,
    left_strands,
    right_chrs,
    right_starts,
    right_ends,
    right_strands,
    is_split,
    slack=None,
))]
#[allow(clippy::too_many_arguments)]
pub fn cluster_numpy(
    py: Python,
    left_chrs: PyReadonlyArray1<i32>,
    left_starts: PyReadonlyArray1<i64>,
    left_ends: PyReadonlyArray1<i64>,
    left_strands: PyReadonlyArray1<bool>,
    right_chrs: PyReadonlyArray1<i32>,
    right_starts: PyReadonlyArray1<i64>,
    right_ends: PyReadonlyArray1<i64>,
    right_strands: PyReadonlyArray1<bool>,
    is_split: PyReadonlyArray1<bool>,
    slack: Option<i64>,
) -> PyResult<LinkArrays> {
    let evidence = sorts::build_evidence(
        left_chrs.as_slice()?,
        left_starts.as_slice()?,
        left_ends.as_slice()?,
        left_strands.as_slice()?,
        right_chrs.as_slice()?,
        right_starts.as_slice()?,
        right_ends.as_slice()?,
        right_strands.as_slice()?,
        is_split.as_slice()?,
    )?;
    check_sorted(&evidence)?;

    let settings = ClusterSettings {
        closure_slack: slack.unwrap_or(0),
        ..ClusterSettings::default()
    };
    let links: Vec<_> = cluster_with_settings(evidence, &settings).collect();
    Ok(into_arrays(py, sorts::link_columns(&links)))
}

#[pyfunction]
#[allow(clippy::too_many_arguments)]
pub fn deduplicate_numpy(
    py: Python,
    left_chrs: PyReadonlyArray1<i32>,
    left_starts: PyReadonlyArray1<i64>,
    left_ends: PyReadonlyArray1<i64>,
    left_strands: PyReadonlyArray1<bool>,
    right_chrs: PyReadonlyArray1<i32>,
    right_starts: PyReadonlyArray1<i64>,
    right_ends: PyReadonlyArray1<i64>,
    right_strands: PyReadonlyArray1<bool>,
    split_counts: PyReadonlyArray1<u32>,
    pair_counts: PyReadonlyArray1<u32>,
) -> PyResult<LinkArrays> {
    let links = sorts::build_links(
        left_chrs.as_slice()?,
        left_starts.as_slice()?,
        left_ends.as_slice()?,
        left_strands.as_slice()?,
        right_chrs.as_slice()?,
        right_starts.as_slice()?,
        right_ends.as_slice()?,
        right_strands.as_slice()?,
        split_counts.as_slice()?,
        pair_counts.as_slice()?,
    )?;
    let merged = deduplicate(links);
    Ok(into_arrays(py, sorts::link_columns(&merged)))
}

#[pymodule]
fn breaklinks(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(cluster_numpy, m)?)?;
    m.add_function(wrap_pyfunction!(deduplicate_numpy, m)?)?;
    Ok(())
}
