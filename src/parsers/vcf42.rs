use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{LineageError, Result};

/*
##fileformat=VCFv4.2
##FORMAT=<ID=GT,Number=1,Type=String,Description="Genotype">
##FORMAT=<ID=DP,Number=1,Type=Integer,Description="Read Depth">
#CHROM  POS     ID      REF     ALT     QUAL    FILTER  INFO    FORMAT  ERR551304       ERR551305
NC_000962.3     24007   .       C       T       228     PASS    DP=61   GT:DP   1:61    0:58
NC_000962.3     633562  .       T       C       228     PASS    DP=70   GT:DP   1:70    .:0

Only POS, FORMAT and the per-sample columns are ever looked at. Single-sample
files from variant callers may carry no #CHROM line at all.
*/

/// Zero-based column of the FORMAT descriptor
pub const FORMAT_COLUMN: usize = 8;
/// Zero-based column of the first sample
pub const FIRST_SAMPLE_COLUMN: usize = 9;

pub struct VcfParser {
    version: Option<String>,
    samples: Option<Vec<String>>,
    reader: Box<dyn BufRead>,
    // First data line, read while looking for the end of the header
    pending: Option<String>,
    line_number: usize,
}

impl VcfParser {
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(LineageError::MissingInput {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path)?;
        Self::from_reader(Box::new(BufReader::new(file)))
    }

    pub fn from_reader(reader: Box<dyn BufRead>) -> Result<Self> {
        let mut parser = Self {
            version: None,
            samples: None,
            reader,
            pending: None,
            line_number: 0,
        };
        parser.parse_header()?;
        Ok(parser)
    }

    fn parse_header(&mut self) -> Result<()> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                break;
            }
            self.line_number += 1;

            if line.starts_with("##fileformat=") {
                self.version = line.split('=').nth(1).map(|x| x.trim().to_string());
            } else if line.starts_with("#CHROM") {
                let samples = line
                    .trim_end_matches(&['\n', '\r'][..])
                    .split('\t')
                    .skip(FIRST_SAMPLE_COLUMN)
                    .map(|x| x.trim().to_string())
                    .collect();
                self.samples = Some(samples);
                break;
            } else if !line.starts_with('#') {
                self.pending = Some(std::mem::take(&mut line));
                break;
            }
        }

        log::debug!(
            "VCF header: version {}, {} sample column(s)",
            self.version.as_deref().unwrap_or("unknown"),
            self.samples.as_ref().map_or(0, |s| s.len())
        );

        Ok(())
    }

    /// Sample names from the #CHROM line, or None if the file had none
    pub fn samples(&self) -> Option<&[String]> {
        self.samples.as_deref()
    }

    pub fn records(&mut self) -> VcfRecords<'_> {
        VcfRecords {
            parser: self,
            done: false,
        }
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        if let Some(line) = self.pending.take() {
            // Already counted by parse_header
            return Ok(Some(line));
        }
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;
        Ok(Some(line))
    }
}

pub struct VcfRecords<'a> {
    parser: &'a mut VcfParser,
    done: bool,
}

impl<'a> Iterator for VcfRecords<'a> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let line = match self.parser.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };

            if line.starts_with('#') {
                continue;
            }

            let line = line.trim_end_matches(&['\n', '\r'][..]);
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 2 {
                continue;
            }

            let line_number = self.parser.line_number;
            let pos = match fields[1].trim().parse::<u64>() {
                Ok(pos) => pos,
                Err(_) => {
                    return Some(Err(LineageError::MalformedPosition {
                        line: line_number,
                        value: fields[1].to_string(),
                    }))
                }
            };

            let format = fields
                .get(FORMAT_COLUMN)
                .map(|f| f.split(':').map(|x| x.to_string()).collect())
                .unwrap_or_default();

            let samples = fields
                .iter()
                .skip(FIRST_SAMPLE_COLUMN)
                .map(|x| x.to_string())
                .collect();

            return Some(Ok(Record {
                pos,
                format,
                samples,
            }));
        }
    }
}

#[derive(Debug, Clone)]
pub struct Record {
    pub pos: u64,
    /// FORMAT keys, in order
    pub format: Vec<String>,
    /// Raw per-sample columns
    pub samples: Vec<String>,
}

impl Record {
    /// Index of the GT sub-field, falling back to the first sub-field when the
    /// FORMAT descriptor does not name one
    pub fn gt_index(&self) -> usize {
        self.format.iter().position(|x| x == "GT").unwrap_or(0)
    }

    /// Genotype token for the sample in column `sample`. None when the column
    /// is absent or has fewer sub-fields than the GT index.
    pub fn genotype(&self, sample: usize) -> Option<&str> {
        let field = self.samples.get(sample)?;
        field.split(':').nth(self.gt_index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser(text: &'static str) -> VcfParser {
        VcfParser::from_reader(Box::new(text.as_bytes())).unwrap()
    }

    #[test]
    fn test_header_and_samples() {
        let mut vcf = parser(
            "##fileformat=VCFv4.2\n\
             #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1\tS2\n\
             chr\t100\t.\tA\tT\t50\tPASS\t.\tGT:DP\t1:30\t0:12\n",
        );
        assert_eq!(vcf.samples().unwrap().to_vec(), vec!["S1".to_string(), "S2".to_string()]);

        let records: Vec<Record> = vcf.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pos, 100);
        assert_eq!(records[0].genotype(0), Some("1"));
        assert_eq!(records[0].genotype(1), Some("0"));
        assert_eq!(records[0].genotype(2), None);
    }

    #[test]
    fn test_headerless_keeps_first_record() {
        let mut vcf = parser("chr\t5\nchr\t6\n");
        assert!(vcf.samples().is_none());
        let positions: Vec<u64> = vcf.records().map(|r| r.unwrap().pos).collect();
        assert_eq!(positions, vec![5, 6]);
    }

    #[test]
    fn test_malformed_position_is_reported_and_iteration_continues() {
        let mut vcf = parser("#CHROM\tPOS\nchr\tabc\nchr\t7\n");
        let results: Vec<Result<Record>> = vcf.records().collect();
        assert_eq!(results.len(), 2);
        match &results[0] {
            Err(LineageError::MalformedPosition { line, value }) => {
                assert_eq!(*line, 2);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(results[1].as_ref().unwrap().pos, 7);
    }

    #[test]
    fn test_gt_index_from_format() {
        let record = Record {
            pos: 1,
            format: vec!["DP".to_string(), "GT".to_string()],
            samples: vec!["30:1".to_string(), "30".to_string()],
        };
        assert_eq!(record.gt_index(), 1);
        assert_eq!(record.genotype(0), Some("1"));
        // Fewer sub-fields than the GT index
        assert_eq!(record.genotype(1), None);

        let no_gt = Record {
            format: vec!["DP".to_string()],
            ..record
        };
        assert_eq!(no_gt.gt_index(), 0);
        assert_eq!(no_gt.genotype(0), Some("30"));
    }

    #[test]
    fn test_empty_input() {
        let mut vcf = parser("");
        assert!(vcf.samples().is_none());
        assert_eq!(vcf.records().count(), 0);
    }
}
