use std::collections::BTreeMap;
use std::path::PathBuf;

use gradebook_xlsx::conf::{
    derive_default_grading_config, derive_default_grading_config_json, parse_grading_config_json,
};
use gradebook_xlsx::dataset::{
    derive_chart_dataset, derive_chart_dataset_from_ipc_bytes, derive_grade_table_from_ipc_bytes,
    parse_roster_text,
};
use gradebook_xlsx::spec::{
    EnumChartKind, GradebookError, SpecChartDataset, SpecGradeTable, SpecGradingConfig,
    SpecValidationIssue, SpecWorkbookDocument,
};
use gradebook_xlsx::validate::{validate_config, validate_grade_table, validate_roster};
use gradebook_xlsx::writer::save_document_to_buffer;
use gradebook_xlsx::{GradebookWriter as RsGradebookWriter, SpecGradebookInputs, generate_workbook};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyAny, PyBytes};

const N_BRIDGE_ABI_VERSION: u64 = 1;
const C_BRIDGE_CONTRACT_VERSION: &str = "gradebook.xlsx.v1";
const C_BRIDGE_TRANSPORT: &str = "polars_ipc";

#[pyclass(name = "GradebookWriter")]
struct PyGradebookWriter {
    #[pyo3(get)]
    file_out: String,
    inner: RsGradebookWriter,
}

#[pymethods]
impl PyGradebookWriter {
    #[new]
    fn new(file_out: String) -> Self {
        let inner = RsGradebookWriter::new(PathBuf::from(&file_out));
        Self { file_out, inner }
    }

    fn __enter__(slf: PyRefMut<'_, Self>) -> PyRefMut<'_, Self> {
        slf
    }

    #[pyo3(signature = (_exc_type=None, _exc=None, _tb=None))]
    fn __exit__(
        &mut self,
        _exc_type: Option<&Bound<'_, PyAny>>,
        _exc: Option<&Bound<'_, PyAny>>,
        _tb: Option<&Bound<'_, PyAny>>,
    ) -> PyResult<()> {
        self.close()
    }

    fn close(&mut self) -> PyResult<()> {
        self.inner.close().map_err(derive_py_err)
    }

    fn sheet_names(&self) -> Vec<String> {
        self.inner.sheet_names().to_vec()
    }

    #[pyo3(signature = (
        students,
        config_json = None,
        grades_ipc = None,
        chart_ipc = None,
        chart_type = None,
        chart_columns = None
    ))]
    fn write_gradebook(
        &mut self,
        students: Vec<String>,
        config_json: Option<&str>,
        grades_ipc: Option<BTreeMap<String, Vec<u8>>>,
        chart_ipc: Option<&[u8]>,
        chart_type: Option<&str>,
        chart_columns: Option<Vec<String>>,
    ) -> PyResult<()> {
        let doc = derive_bridge_document(SpecBridgeRequest {
            students,
            config_json,
            grades_ipc,
            chart_ipc,
            chart_type,
            chart_columns,
        })
        .map_err(derive_py_err)?;
        self.inner.write_document(&doc).map_err(derive_py_err)
    }
}

/// Generate a workbook and save it; returns the path written.
#[pyfunction(name = "generate_workbook")]
#[pyo3(signature = (
    students,
    file_out = None,
    config_json = None,
    grades_ipc = None,
    chart_ipc = None,
    chart_type = None,
    chart_columns = None
))]
fn generate_workbook_file(
    students: Vec<String>,
    file_out: Option<String>,
    config_json: Option<&str>,
    grades_ipc: Option<BTreeMap<String, Vec<u8>>>,
    chart_ipc: Option<&[u8]>,
    chart_type: Option<&str>,
    chart_columns: Option<Vec<String>>,
) -> PyResult<String> {
    let doc = derive_bridge_document(SpecBridgeRequest {
        students,
        config_json,
        grades_ipc,
        chart_ipc,
        chart_type,
        chart_columns,
    })
    .map_err(derive_py_err)?;

    let c_file_out = file_out.unwrap_or_else(|| doc.file_out_default.clone());
    let mut writer = RsGradebookWriter::new(PathBuf::from(&c_file_out));
    writer.write_document(&doc).map_err(derive_py_err)?;
    writer.close().map_err(derive_py_err)?;
    Ok(c_file_out)
}

/// Generate a workbook and return the OOXML package bytes.
#[pyfunction]
#[pyo3(signature = (
    students,
    config_json = None,
    grades_ipc = None,
    chart_ipc = None,
    chart_type = None,
    chart_columns = None
))]
fn generate_workbook_bytes<'py>(
    py: Python<'py>,
    students: Vec<String>,
    config_json: Option<&str>,
    grades_ipc: Option<BTreeMap<String, Vec<u8>>>,
    chart_ipc: Option<&[u8]>,
    chart_type: Option<&str>,
    chart_columns: Option<Vec<String>>,
) -> PyResult<Bound<'py, PyBytes>> {
    let doc = derive_bridge_document(SpecBridgeRequest {
        students,
        config_json,
        grades_ipc,
        chart_ipc,
        chart_type,
        chart_columns,
    })
    .map_err(derive_py_err)?;
    let v_buf = save_document_to_buffer(&doc).map_err(derive_py_err)?;
    Ok(PyBytes::new(py, &v_buf))
}

/// Return the default configuration as JSON text.
#[pyfunction]
fn default_config_json() -> PyResult<String> {
    derive_default_grading_config_json().map_err(derive_py_err)
}

/// Split roster text into student names.
#[pyfunction]
fn parse_roster(text: &str) -> Vec<String> {
    parse_roster_text(text)
}

/// Validate a configuration; returns `(level, message)` pairs.
#[pyfunction(name = "validate_config")]
#[pyo3(signature = (config_json = None))]
fn validate_config_json(config_json: Option<&str>) -> PyResult<Vec<(String, String)>> {
    let config = parse_bridge_config(config_json).map_err(derive_py_err)?;
    Ok(derive_issue_pairs(validate_config(&config)))
}

/// Validate a roster; returns `(level, message)` pairs.
#[pyfunction]
fn validate_students(students: Vec<String>) -> Vec<(String, String)> {
    derive_issue_pairs(validate_roster(&students))
}

/// Validate one grade table; returns `(student, column, value, message)` tuples.
#[pyfunction]
#[pyo3(signature = (grades_ipc, config_json = None))]
fn validate_grades(
    grades_ipc: &[u8],
    config_json: Option<&str>,
) -> PyResult<Vec<(String, String, String, String)>> {
    let config = parse_bridge_config(config_json).map_err(derive_py_err)?;
    let table = derive_grade_table_from_ipc_bytes(grades_ipc).map_err(derive_py_err)?;
    Ok(validate_grade_table(&table, &config)
        .into_iter()
        .map(|issue| {
            (
                issue.student.unwrap_or_default(),
                issue.column.unwrap_or_default(),
                issue.value.unwrap_or_default(),
                issue.message,
            )
        })
        .collect())
}

struct SpecBridgeRequest<'a> {
    students: Vec<String>,
    config_json: Option<&'a str>,
    grades_ipc: Option<BTreeMap<String, Vec<u8>>>,
    chart_ipc: Option<&'a [u8]>,
    chart_type: Option<&'a str>,
    chart_columns: Option<Vec<String>>,
}

fn derive_bridge_document(request: SpecBridgeRequest<'_>) -> Result<SpecWorkbookDocument, GradebookError> {
    let config = parse_bridge_config(request.config_json)?;

    let mut dict_grades: BTreeMap<String, SpecGradeTable> = BTreeMap::new();
    for (period, v_ipc_df) in request.grades_ipc.unwrap_or_default() {
        dict_grades.insert(period, derive_grade_table_from_ipc_bytes(&v_ipc_df)?);
    }

    let chart_dataset: Option<SpecChartDataset> = match (request.chart_ipc, &request.chart_columns) {
        (Some(v_ipc_df), _) => Some(derive_chart_dataset_from_ipc_bytes(v_ipc_df)?),
        (None, Some(l_columns)) => Some(derive_chart_dataset(
            &config,
            &request.students,
            &dict_grades,
            l_columns,
        )),
        (None, None) => None,
    };
    let chart_kind = request.chart_type.map(EnumChartKind::from_name);

    let mut inputs = SpecGradebookInputs::new(&config, &request.students).with_grades(&dict_grades);
    if let (Some(dataset), Some(kind)) = (&chart_dataset, chart_kind) {
        inputs = inputs.with_chart(dataset, kind);
    }
    generate_workbook(inputs)
}

fn parse_bridge_config(config_json: Option<&str>) -> Result<SpecGradingConfig, GradebookError> {
    match config_json {
        Some(text) => parse_grading_config_json(text),
        None => Ok(derive_default_grading_config()),
    }
}

fn derive_issue_pairs(l_issues: Vec<SpecValidationIssue>) -> Vec<(String, String)> {
    l_issues
        .into_iter()
        .map(|issue| (issue.level.as_str().to_string(), issue.message))
        .collect()
}

fn derive_py_err(err: GradebookError) -> PyErr {
    match err {
        GradebookError::Configuration(_) | GradebookError::Data(_) | GradebookError::Json(_) => {
            PyValueError::new_err(err.to_string())
        }
        _ => PyRuntimeError::new_err(err.to_string()),
    }
}

#[pymodule]
fn _gradebook_xlsx_rs(_py: Python<'_>, module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PyGradebookWriter>()?;
    module.add_function(wrap_pyfunction!(generate_workbook_file, module)?)?;
    module.add_function(wrap_pyfunction!(generate_workbook_bytes, module)?)?;
    module.add_function(wrap_pyfunction!(default_config_json, module)?)?;
    module.add_function(wrap_pyfunction!(parse_roster, module)?)?;
    module.add_function(wrap_pyfunction!(validate_config_json, module)?)?;
    module.add_function(wrap_pyfunction!(validate_students, module)?)?;
    module.add_function(wrap_pyfunction!(validate_grades, module)?)?;
    module.add("__bridge_abi__", N_BRIDGE_ABI_VERSION)?;
    module.add("__bridge_contract__", C_BRIDGE_CONTRACT_VERSION)?;
    module.add("__bridge_transport__", C_BRIDGE_TRANSPORT)?;
    Ok(())
}
