use chrono::NaiveDateTime;
use gdal::Dataset;
use ndarray::Array2;

use crate::discovery::FileRef;
use crate::error::Result;
use crate::spatial::Reprojection;
use crate::temporal;

/// The observation files of one run and their distinct acquisition dates.
#[derive(Debug)]
pub struct Observations<'a> {
    file_refs: Vec<FileRef>,
    dates: Vec<NaiveDateTime>,
    reprojection: &'a Reprojection,
}

impl<'a> Observations<'a> {
    pub fn new(file_refs: Vec<FileRef>, reprojection: &'a Reprojection) -> Self {
        let dates = temporal::observation_dates(&file_refs);
        Self {
            file_refs,
            dates,
            reprojection,
        }
    }

    pub fn dates(&self) -> &[NaiveDateTime] {
        &self.dates
    }

    pub fn num_dates(&self) -> usize {
        self.dates.len()
    }

    /// The observations acquired in `[start, end)`.
    pub fn subset(&self, start: NaiveDateTime, end: NaiveDateTime) -> ObservationWindow<'_> {
        let observations = self
            .file_refs
            .iter()
            .filter(|file_ref| temporal::in_window(file_ref.start_time, start, end))
            .collect();
        ObservationWindow {
            start,
            end,
            observations,
            reprojection: self.reprojection,
        }
    }
}

/// Observations of one time window, readable on the destination grid.
#[derive(Debug)]
pub struct ObservationWindow<'a> {
    start: NaiveDateTime,
    end: NaiveDateTime,
    observations: Vec<&'a FileRef>,
    reprojection: &'a Reprojection,
}

impl<'a> ObservationWindow<'a> {
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn observations(&self) -> &[&'a FileRef] {
        &self.observations
    }

    pub fn of_type(&self, data_type: &str) -> Vec<&'a FileRef> {
        self.observations
            .iter()
            .copied()
            .filter(|file_ref| file_ref.data_type == data_type)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn reprojection(&self) -> &Reprojection {
        self.reprojection
    }

    pub fn read(&self, file_ref: &FileRef) -> Result<Array2<f32>> {
        self.read_band(file_ref, 1)
    }

    /// Reads `band_index` of an observation, reprojected onto the destination grid.
    pub fn read_band(&self, file_ref: &FileRef, band_index: usize) -> Result<Array2<f32>> {
        let dataset = Dataset::open(&file_ref.url)?;
        self.reprojection.reproject_band(&dataset, band_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::{Bbox, srs::wgs84};
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_subset_selects_half_open_window() {
        let reprojection = Reprojection::new(
            Bbox::new(0.0, 1.0, 0.0, 1.0).unwrap(),
            0.5,
            0.5,
            wgs84().unwrap(),
            wgs84().unwrap(),
        )
        .unwrap();
        let files = vec![
            FileRef::new("S2_20200101.tif", "S2", day(1), day(1)),
            FileRef::new("S1_20200101.tif", "S1", day(1), day(1)),
            FileRef::new("S2_20200116.tif", "S2", day(16), day(16)),
        ];
        let observations = Observations::new(files, &reprojection);
        assert_eq!(observations.num_dates(), 2);

        let window = observations.subset(day(1), day(16));
        assert_eq!(window.len(), 2);
        assert_eq!(window.of_type("S2").len(), 1);
        assert_eq!(window.start(), day(1));
        assert_eq!(window.end(), day(16));

        assert!(observations.subset(day(2), day(16)).is_empty());
    }
}
