/// Bruker TopSpin processed-data reader
///
/// Reads `<expno>/pdata/<n>/` directly: the `procs`/`proc2s`/... parameter
/// files give sweep width, spectrometer frequency, offset and storage layout
/// for each dimension, and the `1r`/`2rr`/`3rrr`/`4rrrr` file holds the real
/// part of the processed spectrum.
///
/// Multidimensional processed files are stored as tiles of `XDIM` points per
/// dimension; they are reassembled into plain row-major order here.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use super::spectrum::{Dimension, IntensityArray, RawSpectrum};
use crate::error::ReadError;

/// Highest rank looked for on disk. Ranks above 2 are read but not analysed.
const MAX_RANK: usize = 4;

// ────────────────────────────────────────────────────────────────
//  Parameter files
// ────────────────────────────────────────────────────────────────

/// Parse a Bruker JCAMP-style parameter file (`acqus`, `procs`, `proc2s`, ...).
///
/// These files use `##$PARAM= value` lines; array values open with `(` and
/// continue on the following lines.
pub fn parse_params(content: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    let mut pending: Option<(String, String)> = None;

    for line in content.lines() {
        if line.starts_with("$$") {
            continue;
        }
        let Some(record) = line.strip_prefix("##") else {
            // continuation of an array value
            if let Some((_, value)) = pending.as_mut() {
                value.push(' ');
                value.push_str(line.trim());
            }
            continue;
        };
        if let Some((key, value)) = pending.take() {
            params.insert(key, value.trim().to_string());
        }
        // plain `##KEY=` records (TITLE, END, ...) close the previous value only
        pending = record
            .strip_prefix('$')
            .and_then(|r| r.split_once('='))
            .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()));
    }
    if let Some((key, value)) = pending {
        params.insert(key, value.trim().to_string());
    }

    params
}

fn get_f64(params: &HashMap<String, String>, key: &str) -> Option<f64> {
    params.get(key).and_then(|v| v.parse::<f64>().ok())
}

fn get_i32(params: &HashMap<String, String>, key: &str) -> i32 {
    params
        .get(key)
        .and_then(|v| v.parse::<i32>().ok())
        .unwrap_or(0)
}

fn get_str(params: &HashMap<String, String>, key: &str) -> String {
    params
        .get(key)
        .map(|v| v.trim_matches(|c| c == '<' || c == '>').trim().to_string())
        .unwrap_or_default()
}

/// `procs` for the direct dimension, `proc{n}s` for the others.
fn proc_file_name(dim: usize) -> String {
    if dim == 1 {
        "procs".to_string()
    } else {
        format!("proc{}s", dim)
    }
}

/// `1r`, `2rr`, `3rrr`, `4rrrr`.
fn data_file_name(rank: usize) -> String {
    format!("{}{}", rank, "r".repeat(rank))
}

/// Processing parameters of one dimension (1 = direct).
#[derive(Debug, Clone)]
struct ProcParams {
    size: usize,
    submatrix: usize,
    dimension: Dimension,
}

fn required_f64(
    params: &HashMap<String, String>,
    file: &str,
    key: &'static str,
) -> Result<f64, ReadError> {
    match get_f64(params, key) {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(ReadError::InvalidParameter {
            file: file.to_string(),
            key,
            reason: "missing or not a number".to_string(),
        }),
    }
}

fn read_proc_params(pdata_dir: &Path, dim: usize) -> Result<ProcParams, ReadError> {
    let name = proc_file_name(dim);
    let path = pdata_dir.join(&name);
    if !path.exists() {
        return Err(ReadError::MissingFile(path));
    }
    let params = parse_params(&fs::read_to_string(&path)?);

    let sw_hz = required_f64(&params, &name, "SW_p")?;
    let sf_mhz = required_f64(&params, &name, "SF")?;
    let offset_ppm = required_f64(&params, &name, "OFFSET")?;

    let mut label = get_str(&params, "AXNUC");
    if label.is_empty() || label == "off" {
        label = format!("F{}", dim);
    }

    let size = get_i32(&params, "SI").max(0) as usize;
    let submatrix = get_i32(&params, "XDIM").max(0) as usize;

    // OFFSET is the ppm of the first (high-ppm) point; the carrier sits half
    // a sweep width below it.
    let carrier_hz = offset_ppm * sf_mhz - sw_hz / 2.0;

    Ok(ProcParams {
        size,
        submatrix,
        dimension: Dimension::new(&label, sw_hz, sf_mhz, carrier_hz),
    })
}

// ────────────────────────────────────────────────────────────────
//  Reader
// ────────────────────────────────────────────────────────────────

/// Read processed data number `pdata` of the experiment in `expno_dir`.
///
/// The highest-rank data file present wins, so a 3D experiment comes back
/// as a rank-3 [`RawSpectrum`] for the analysis layer to reject.
pub fn read_processed(expno_dir: &Path, pdata: u32) -> Result<RawSpectrum, ReadError> {
    let pdata_dir = expno_dir.join("pdata").join(pdata.to_string());
    if !pdata_dir.is_dir() {
        return Err(ReadError::MissingFile(pdata_dir));
    }

    let rank = (1..=MAX_RANK)
        .rev()
        .find(|&r| pdata_dir.join(data_file_name(r)).exists())
        .ok_or_else(|| ReadError::MissingFile(pdata_dir.join(data_file_name(1))))?;
    let data_path = pdata_dir.join(data_file_name(rank));
    log::info!("Reading Bruker {}D processed data: {}", rank, data_path.display());

    // Native order is outer-to-inner: proc{rank}s ... proc2s, procs
    let mut procs = Vec::with_capacity(rank);
    for dim in (1..=rank).rev() {
        procs.push(read_proc_params(&pdata_dir, dim)?);
    }

    let direct = parse_params(&fs::read_to_string(pdata_dir.join("procs"))?);
    let nc_proc = get_i32(&direct, "NC_proc");
    let bytordp = get_i32(&direct, "BYTORDP");
    let dtypp = get_i32(&direct, "DTYPP");
    let word_size = if dtypp == 2 { 8 } else { 4 };

    let raw = fs::read(&data_path)?;

    let mut shape: Vec<usize> = procs.iter().map(|p| p.size).collect();
    if rank == 1 && shape[0] == 0 {
        shape[0] = raw.len() / word_size;
    }
    if let Some(pos) = shape.iter().position(|&s| s == 0) {
        return Err(ReadError::InvalidParameter {
            file: proc_file_name(rank - pos),
            key: "SI",
            reason: "missing or zero".to_string(),
        });
    }

    let too_large = || ReadError::InvalidParameter {
        file: proc_file_name(1),
        key: "SI",
        reason: format!("{:?} points do not fit in memory", shape),
    };
    let total = shape
        .iter()
        .try_fold(1usize, |acc, &s| acc.checked_mul(s))
        .ok_or_else(too_large)?;
    let expected = total.checked_mul(word_size).ok_or_else(too_large)?;
    if raw.len() < expected {
        return Err(ReadError::Truncated {
            expected,
            got: raw.len(),
        });
    }

    let scale = 2.0f64.powi(nc_proc);
    let values = if dtypp == 2 {
        read_float64_data(&raw, total, bytordp, scale)?
    } else {
        read_int32_data(&raw, total, bytordp, scale)?
    };

    let submatrix: Vec<usize> = procs.iter().map(|p| p.submatrix).collect();
    let values = reorder_submatrix(&values, &shape, &submatrix);

    let data = IntensityArray::new(shape, values).map_err(|e| ReadError::InvalidParameter {
        file: data_file_name(rank),
        key: "SI",
        reason: e.to_string(),
    })?;

    Ok(RawSpectrum {
        source_path: expno_dir.to_path_buf(),
        dimensions: procs.into_iter().map(|p| p.dimension).collect(),
        data,
    })
}

/// Read binary data as 32-bit integers, scaled
fn read_int32_data(
    raw: &[u8],
    npoints: usize,
    bytordp: i32,
    scale: f64,
) -> Result<Vec<f64>, ReadError> {
    let mut cursor = Cursor::new(raw);
    let mut data = Vec::with_capacity(npoints);
    for _ in 0..npoints {
        let val = if bytordp == 0 {
            cursor.read_i32::<LittleEndian>()?
        } else {
            cursor.read_i32::<BigEndian>()?
        };
        data.push(val as f64 * scale);
    }
    Ok(data)
}

/// Read binary data as 64-bit floats, scaled
fn read_float64_data(
    raw: &[u8],
    npoints: usize,
    bytordp: i32,
    scale: f64,
) -> Result<Vec<f64>, ReadError> {
    let mut cursor = Cursor::new(raw);
    let mut data = Vec::with_capacity(npoints);
    for _ in 0..npoints {
        let val = if bytordp == 0 {
            cursor.read_f64::<LittleEndian>()?
        } else {
            cursor.read_f64::<BigEndian>()?
        };
        data.push(val * scale);
    }
    Ok(data)
}

// ────────────────────────────────────────────────────────────────
//  Submatrix reordering
// ────────────────────────────────────────────────────────────────

fn unravel(mut index: usize, dims: &[usize]) -> Vec<usize> {
    let mut out = vec![0; dims.len()];
    for (slot, &d) in out.iter_mut().zip(dims).rev() {
        *slot = index % d;
        index /= d;
    }
    out
}

/// Reassemble tiled data into row-major order.
///
/// The file holds `prod(shape / submatrix)` tiles in row-major tile order,
/// each tile itself row-major. Data that is not tiled (or whose tile sizes do
/// not divide the shape) is returned unchanged.
pub fn reorder_submatrix(values: &[f64], shape: &[usize], submatrix: &[usize]) -> Vec<f64> {
    let tiled = shape.len() > 1
        && submatrix.len() == shape.len()
        && submatrix.iter().zip(shape).any(|(&t, &s)| t > 0 && t < s);
    if !tiled {
        return values.to_vec();
    }
    if submatrix
        .iter()
        .zip(shape)
        .any(|(&t, &s)| t == 0 || s % t != 0)
    {
        log::warn!(
            "Submatrix {:?} does not tile shape {:?}; keeping file order",
            submatrix,
            shape
        );
        return values.to_vec();
    }

    let tiles_per_dim: Vec<usize> = shape.iter().zip(submatrix).map(|(s, t)| s / t).collect();
    let tile_len: usize = submatrix.iter().product();
    let ntiles: usize = tiles_per_dim.iter().product();

    let mut strides = vec![1usize; shape.len()];
    for i in (0..shape.len() - 1).rev() {
        strides[i] = strides[i + 1] * shape[i + 1];
    }

    let mut out = vec![0.0; values.len()];
    for tile in 0..ntiles {
        let tile_idx = unravel(tile, &tiles_per_dim);
        for local in 0..tile_len {
            let local_idx = unravel(local, submatrix);
            let dest: usize = (0..shape.len())
                .map(|d| (tile_idx[d] * submatrix[d] + local_idx[d]) * strides[d])
                .sum();
            out[dest] = values[tile * tile_len + local];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;
    use std::path::PathBuf;

    fn scratch_expno() -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("nmrplot-{}", uuid::Uuid::new_v4()))
            .join("1");
        fs::create_dir_all(dir.join("pdata/1")).unwrap();
        dir
    }

    fn write_procs(dir: &Path, name: &str, si: usize, xdim: usize, nuc: &str) {
        let content = format!(
            "##TITLE= Parameter file\n##$AXNUC= <{nuc}>\n##$BYTORDP= 0\n##$DTYPP= 0\n\
             ##$NC_proc= -2\n##$OFFSET= 10\n##$SF= 500\n##$SI= {si}\n##$SW_p= 6000\n\
             ##$XDIM= {xdim}\n##END=\n"
        );
        fs::write(dir.join("pdata/1").join(name), content).unwrap();
    }

    fn write_int32(path: &Path, values: &[i32]) {
        let mut buf = Vec::new();
        for &v in values {
            buf.write_i32::<LittleEndian>(v).unwrap();
        }
        fs::write(path, buf).unwrap();
    }

    #[test]
    fn test_parse_params_basic() {
        let content = r#"##TITLE= Parameter file
##$SW_p= 8012.820
##$SI= 32768
##$SF= 400.13
##$AXNUC= <1H>
##$TI= (0..1)
first line
second)
##END=
"#;
        let params = parse_params(content);
        assert_eq!(params.get("SW_p").unwrap(), "8012.820");
        assert_eq!(get_i32(&params, "SI"), 32768);
        assert_eq!(get_str(&params, "AXNUC"), "1H");
        assert!(params.get("TI").unwrap().contains("first line"));
        assert_eq!(get_f64(&params, "MISSING"), None);
        assert!(!params.contains_key("TITLE"));
        assert!(!params.contains_key("END"));
    }

    #[test]
    fn test_parse_params_skips_comments_and_joins_arrays() {
        let content = "##$XDIM= 64\n$$ /opt/data/exp/1/pdata/1/procs\n\
                       ##$LB= (0..2)\n0.3 1\n0.5\n##$PHC0= -12.5\n";
        let params = parse_params(content);
        assert_eq!(params.get("XDIM").unwrap(), "64");
        assert_eq!(params.get("LB").unwrap(), "(0..2) 0.3 1 0.5");
        assert_eq!(get_f64(&params, "PHC0"), Some(-12.5));
    }

    #[test]
    fn test_reorder_submatrix_2d() {
        // 4x4 matrix stored as four 2x2 tiles
        let file_order = vec![
            0.0, 1.0, 4.0, 5.0, // tile (0,0)
            2.0, 3.0, 6.0, 7.0, // tile (0,1)
            8.0, 9.0, 12.0, 13.0, // tile (1,0)
            10.0, 11.0, 14.0, 15.0, // tile (1,1)
        ];
        let out = reorder_submatrix(&file_order, &[4, 4], &[2, 2]);
        let expected: Vec<f64> = (0..16).map(|v| v as f64).collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_reorder_untiled_is_identity() {
        let values: Vec<f64> = (0..6).map(|v| v as f64).collect();
        assert_eq!(reorder_submatrix(&values, &[2, 3], &[2, 3]), values);
        assert_eq!(reorder_submatrix(&values, &[2, 3], &[0, 0]), values);
        assert_eq!(reorder_submatrix(&values, &[6], &[2]), values);
    }

    #[test]
    fn test_read_processed_1d() {
        let expno = scratch_expno();
        write_procs(&expno, "procs", 4, 0, "1H");
        write_int32(&expno.join("pdata/1/1r"), &[4, -8, 12, 400]);

        let raw = read_processed(&expno, 1).unwrap();
        assert_eq!(raw.rank(), 1);
        assert_eq!(raw.data.values(), &[1.0, -2.0, 3.0, 100.0]);
        let dim = &raw.dimensions[0];
        assert_eq!(dim.label, "1H");
        assert!((dim.sweep_width_hz - 6000.0).abs() < 1e-9);
        assert!((dim.observed_freq_mhz - 500.0).abs() < 1e-9);
        // high edge = (carrier + sw/2) / sf = OFFSET
        assert!(((dim.carrier_hz + 3000.0) / 500.0 - 10.0).abs() < 1e-9);

        fs::remove_dir_all(expno.parent().unwrap()).ok();
    }

    #[test]
    fn test_read_processed_2d_tiled() {
        let expno = scratch_expno();
        write_procs(&expno, "procs", 4, 2, "1H");
        write_procs(&expno, "proc2s", 2, 2, "13C");
        // 2 rows x 4 cols stored as two 2x2 tiles
        write_int32(
            &expno.join("pdata/1/2rr"),
            &[0, 4, 16, 20, 8, 12, 24, 28],
        );

        let raw = read_processed(&expno, 1).unwrap();
        assert_eq!(raw.data.shape(), &[2, 4]);
        assert_eq!(raw.dimensions[0].label, "13C");
        assert_eq!(raw.dimensions[1].label, "1H");
        assert_eq!(raw.data.row(0).unwrap(), &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(raw.data.row(1).unwrap(), &[4.0, 5.0, 6.0, 7.0]);

        fs::remove_dir_all(expno.parent().unwrap()).ok();
    }

    #[test]
    fn test_read_processed_3d_is_returned_as_rank_3() {
        let expno = scratch_expno();
        write_procs(&expno, "procs", 2, 0, "1H");
        write_procs(&expno, "proc2s", 2, 0, "15N");
        write_procs(&expno, "proc3s", 2, 0, "13C");
        write_int32(&expno.join("pdata/1/3rrr"), &[0; 8]);

        let raw = read_processed(&expno, 1).unwrap();
        assert_eq!(raw.rank(), 3);
        assert_eq!(raw.labels(), vec!["1H", "15N", "13C"]);

        fs::remove_dir_all(expno.parent().unwrap()).ok();
    }

    #[test]
    fn test_read_processed_truncated() {
        let expno = scratch_expno();
        write_procs(&expno, "procs", 8, 0, "1H");
        write_int32(&expno.join("pdata/1/1r"), &[1, 2, 3]);

        match read_processed(&expno, 1) {
            Err(ReadError::Truncated { expected, got }) => {
                assert_eq!(expected, 32);
                assert_eq!(got, 12);
            }
            other => panic!("expected Truncated, got {:?}", other),
        }

        fs::remove_dir_all(expno.parent().unwrap()).ok();
    }

    #[test]
    fn test_read_processed_rejects_oversized_shape() {
        let expno = scratch_expno();
        for name in ["procs", "proc2s", "proc3s"] {
            write_procs(&expno, name, i32::MAX as usize, 0, "1H");
        }
        write_int32(&expno.join("pdata/1/3rrr"), &[0; 8]);

        match read_processed(&expno, 1) {
            Err(ReadError::InvalidParameter { key, .. }) => assert_eq!(key, "SI"),
            other => panic!("expected InvalidParameter, got {:?}", other),
        }

        fs::remove_dir_all(expno.parent().unwrap()).ok();
    }

    #[test]
    fn test_read_processed_missing_pdata() {
        let expno = scratch_expno();
        assert!(matches!(
            read_processed(&expno, 7),
            Err(ReadError::MissingFile(_))
        ));
        fs::remove_dir_all(expno.parent().unwrap()).ok();
    }
}
