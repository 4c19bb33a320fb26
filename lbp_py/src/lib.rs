use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyBytes;

use ::lbp_rust::{apply_algorithm, compute, default_config, poll_every, process, Config, LbpError, Params, PixelGrid, Strategy};

fn to_py_err(e: LbpError) -> PyErr {
    if e.is_rejection() {
        PyValueError::new_err(e.to_string())
    } else {
        PyRuntimeError::new_err(e.to_string())
    }
}

fn build_config_from_kwargs(processes: Option<usize>, algorithm: &str, poll_ms: Option<u64>, timings: bool) -> PyResult<Config> {
    let mut cfg = default_config();
    apply_algorithm(&mut cfg, algorithm).map_err(to_py_err)?;
    if let Some(v) = processes { cfg.workers = v; }
    if let Some(ms) = poll_ms { cfg.gather = poll_every(ms); }
    cfg.timings = timings;
    Ok(cfg)
}

#[pyfunction]
#[pyo3(signature = (
    image,
    *,
    processes = None,
    algorithm = "lbp",
    poll_ms = None,
))]
pub fn compute_image(
    py: Python<'_>,
    image: &PyAny,
    processes: Option<usize>,
    algorithm: &str,
    poll_ms: Option<u64>,
) -> PyResult<PyObject> {
    // Grayscale and pull pixel data
    let img_l = image.call_method1("convert", ("L",))?;
    let (w, h): (u32, u32) = img_l.getattr("size")?.extract()?;
    let data: Vec<u8> = img_l.call_method0("tobytes")?.extract()?;

    let cfg = build_config_from_kwargs(processes, algorithm, poll_ms, false)?;
    let grid = PixelGrid::new(w, h, data).map_err(to_py_err)?;
    let (out_w, out_h) = grid.interior_dims();

    // Workers do not touch Python objects
    let patterns = py.allow_threads(|| compute(&grid, &cfg)).map_err(to_py_err)?;

    // Return a PIL.Image.Image via Image.frombytes("L", (w,h), data)
    let pil = PyModule::import(py, "PIL.Image")?;
    let py_img = pil.call_method1("frombytes", ("L", (out_w, out_h), PyBytes::new(py, &patterns)))?;
    Ok(py_img.into())
}

#[pyfunction]
#[pyo3(signature = (
    input_path,
    output_path = None,
    *,
    processes = None,
    algorithm = "lbp",
    poll_ms = None,
    timings = false,
))]
pub fn compute_file(
    py: Python<'_>,
    input_path: String,
    output_path: Option<String>,
    processes: Option<usize>,
    algorithm: &str,
    poll_ms: Option<u64>,
    timings: bool,
) -> PyResult<f64> {
    let cfg = build_config_from_kwargs(processes, algorithm, poll_ms, timings)?;
    let params = Params { input: input_path.into(), output: output_path.map(Into::into), config: cfg };
    let report = py
        .allow_threads(|| process(params))
        .map_err(|e| PyRuntimeError::new_err(format!("{e:#}")))?;
    Ok(report.elapsed.as_secs_f64())
}

#[pymodule]
fn lbp(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(compute_image, m)?)?;
    m.add_function(wrap_pyfunction!(compute_file, m)?)?;
    let mut names: Vec<&str> = Strategy::ALL.iter().map(|s| s.name()).collect();
    names.push("multi-lbp-mpi");
    m.add("ALGORITHMS", names)?;
    Ok(())
}
