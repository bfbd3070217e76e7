//! Reference catalog of diagnostic SNP positions per lineage.
//!
//! The catalog is built once at startup, either from the embedded table or
//! from a TSV file, and handed by reference to everything that needs it.
//! Entry order is significant: it drives report columns and the best-match
//! tie-break.

use std::collections::HashSet;
use std::io::BufRead;
use std::path::Path;

use crate::error::{LineageError, Result};

/// One lineage and its marker set
#[derive(Debug, Clone)]
pub struct Lineage {
    pub id: String,
    pub markers: HashSet<u64>,
}

#[derive(Debug, Clone)]
pub struct ReferenceCatalog {
    lineages: Vec<Lineage>,
}

impl ReferenceCatalog {
    /// Catalog compiled into the binary (M. tuberculosis complex lineages,
    /// sub-lineages and animal-adapted ecotypes)
    pub fn builtin() -> Self {
        let lineages = BUILTIN_CATALOG
            .iter()
            .map(|(id, positions)| Lineage {
                id: id.to_string(),
                markers: positions.iter().copied().collect(),
            })
            .collect();
        Self { lineages }
    }

    /// Load a catalog from a TSV file: `lineage<TAB>pos,pos,...`
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(LineageError::MissingInput {
                path: path.to_path_buf(),
            });
        }
        let reader = std::io::BufReader::new(std::fs::File::open(path)?);
        Self::from_reader(reader)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut catalog = Self {
            lineages: Vec::new(),
        };

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut split = line.splitn(2, '\t');
            let id = split.next().unwrap_or_default().trim();
            if id.is_empty() {
                return Err(LineageError::catalog(line_no, "missing lineage identifier"));
            }

            let mut markers = HashSet::new();
            for value in split.next().unwrap_or_default().split(',') {
                let value = value.trim();
                if value.is_empty() {
                    continue;
                }
                let pos = value.parse::<u64>().map_err(|_| {
                    let message = format!("invalid position {:?} for {}", value, id);
                    LineageError::catalog(line_no, message)
                })?;
                markers.insert(pos);
            }

            catalog.push(line_no, id.to_string(), markers)?;
        }

        if catalog.is_empty() {
            return Err(LineageError::catalog(0, "catalog contains no lineages"));
        }

        Ok(catalog)
    }

    fn push(&mut self, line_no: usize, id: String, markers: HashSet<u64>) -> Result<()> {
        if self.get(&id).is_some() {
            return Err(LineageError::catalog(line_no, format!("duplicate lineage {}", id)));
        }
        self.lineages.push(Lineage { id, markers });
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Lineage> {
        self.lineages.iter().find(|l| l.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Lineage> {
        self.lineages.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.lineages.iter().map(|l| l.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.lineages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lineages.is_empty()
    }
}

impl<'a> IntoIterator for &'a ReferenceCatalog {
    type Item = &'a Lineage;
    type IntoIter = std::slice::Iter<'a, Lineage>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

const BUILTIN_CATALOG: &[(&str, &[u64])] = &[
    (
        "lineage1",
        &[
            244550, 272678, 344288, 495473, 615938, 646531, 763886, 811492, 812502, 1119739,
            1560912, 2508395, 2897528, 3233605, 3647591, 3830566, 3876953, 4022652, 4081987,
            4081996, 4398732,
        ],
    ),
    ("l1_1", &[2989683, 4404247]),
    ("l1_2", &[9260, 1136017, 1553855, 2462700, 3561229, 4049254, 4244420]),
    ("l1_3", &[2763624, 3470377, 4238120]),
    (
        "lineage2",
        &[
            282892, 497491, 518987, 811753, 1834177, 2298194, 4050811, 4158493, 4236237, 4243460,
            4254431, 4290135, 4308395,
        ],
    ),
    ("l2_2_1", &[1565566, 2640807, 3147511]),
    ("l2_2_2", &[1565566, 2640807, 3147511]),
    ("lineage3", &[24007, 633562, 2840999, 3582694]),
    ("l3_1_1", &[2467098, 2744388, 3023684]),
    ("l3_1_2", &[1914217, 3722702]),
    ("lineage4", &[1170404, 1341624, 3381641, 3482432]),
    ("l4_1", &[62657, 284623, 2020144, 2739174, 4340006]),
    (
        "l4_2",
        &[
            1466779, 1568018, 1670814, 1872211, 2441970, 3198496, 3469694, 3666905, 4073918,
            4291449,
        ],
    ),
    ("l4_3", &[764995, 1389738, 1452071, 2621058, 3191027, 4038287]),
    ("l4_4", &[4238963]),
    ("l4_6", &[18091, 54304]),
    ("l4_8", &[1130526]),
    ("l4_9", &[8978, 1882573, 1940611, 4165205]),
    (
        "lineage5",
        &[
            9566, 344258, 352646, 801959, 910282, 1097633, 1145442, 1216822, 1256176, 1352566,
            1505806, 1555432, 1578212, 1648089, 1648224, 1649265, 1799921, 1911301, 2304017,
            2463455, 2485956, 2516804, 2744225, 3603523, 3840932, 3882025, 4086604, 4339610,
            4387392, 4399422,
        ],
    ),
    (
        "lineage6",
        &[
            334445, 507989, 1069146, 1372002, 1867707, 1886077, 2427828, 2847737, 3155164, 3213255,
            3862148, 4086697, 4236891,
        ],
    ),
    (
        "lineage7",
        &[
            8876, 22303, 73456, 349081, 497126, 811642, 1125894, 1137518, 1237743, 1297084, 1365895,
            1463776, 1513250, 1561245, 1799774, 1867937, 2035938, 2086202, 2303524, 2305184,
            2380244, 2383599, 2385615, 2406193, 2414272, 2414434, 2759363, 2833478, 2842238,
            2871227, 2913373, 2999030, 3009027, 3182040, 3225566, 3324231, 3360233, 3470461,
            3473482, 3603631, 3635935, 3667883, 3860696, 4070302, 4113054, 4262608, 4308411,
        ],
    ),
    (
        "lineage8",
        &[
            17333, 23098, 343314, 442577, 459561, 508454, 595051, 742270, 765772, 1227518, 1391766,
            1391967, 1446846, 1505182, 1505455, 1553399, 1594788, 1665285, 1704707, 1805152,
            1858921, 1914246, 1922231, 1941256, 2022784, 2086736, 2295359, 2306915, 2415402,
            2440802, 2450263, 2466760, 2862497, 2939600, 2940079, 3074400, 3151706, 3333720,
            3469397, 3569319, 3645324, 3786517, 3830815, 3840800, 4034711, 4074512, 4210592,
            4227348, 4254755, 4410891,
        ],
    ),
    ("lineage9", &[3094577, 3225892, 3370805, 3414553]),
    (
        "bovis",
        &[
            45193, 62768, 354054, 437465, 602207, 648667, 652935, 905082, 1137632, 1344741, 1462220,
            1492605, 1647117, 1671658, 1800521, 1813494, 2444952, 2643109, 2716806, 2767842,
            2782927, 2844761, 3022532, 3199071, 3323617, 3371401, 3623372, 3667193, 3723227,
            3876953, 4034981, 4038403, 4229470,
        ],
    ),
    ("caprae", &[422182, 649585, 1673766, 2292409, 4398204]),
    (
        "dassie",
        &[
            557574, 1218256, 1226531, 1390170, 1554550, 1663500, 1751197, 2271988, 2825199, 2846051,
            2862458, 2871821, 2909119, 3062450, 3155107, 3392478, 3635392, 4085665, 4242313,
        ],
    ),
    ("microtii", &[5671, 247252, 1004570, 1364877, 2874797, 3688579]),
    (
        "mungi",
        &[
            24974, 45904, 64790, 73027, 270869, 284041, 333878, 352481, 437264, 570683, 649036,
            1216954, 1256212, 1567814, 2018219, 2022409, 2427519, 2437426, 2686388, 2747554,
            2780127, 2924039, 2937949, 2993651, 2999330, 3180094, 3326925, 3372917, 3625360,
            3829350, 4224851, 4268672, 4274530, 4409917,
        ],
    ),
    (
        "orygis",
        &[
            6109, 8930, 44812, 53899, 247300, 268953, 459600, 498771, 500710, 587601, 634348,
            748320, 1125468, 1216738, 1236745, 1344807, 1383800, 1449038, 1490258, 1555342, 1579197,
            1652839, 1810542, 1834363, 1918811, 2296634, 2298548, 2301395, 2309820, 2429276,
            2486576, 3039261, 3058989, 3061003, 3147196, 3148454, 3155260, 3241414, 3337480,
            3337675, 3562936, 3598221, 3667352, 3770449, 4039853, 4067010, 4069621, 4409725,
        ],
    ),
    (
        "pinepedii",
        &[
            28344, 348280, 458156, 458617, 736140, 918007, 1036936, 1391466, 1577723, 1648564,
            1650257, 1650258, 1924695, 1937070, 2301448, 2301749, 2352292, 2908666, 2942959,
            3090780, 3145957, 3337219, 3469951, 4161188,
        ],
    ),
    (
        "surricate",
        &[
            21664, 286579, 344135, 351101, 495566, 741841, 763375, 765004, 1366453, 1650665,
            1831339, 1883911, 2069610, 2410438, 2428451, 2716491, 2746981, 2762930, 2872678,
            2914435, 3060380, 3233351, 3233747, 3343629, 3396110, 3603697, 4049678, 4396201,
        ],
    ),
];
