use aamva_pdf417::pdf417::{
    self,
    cluster::{self, cluster_of, run_lengths, Pattern, PATTERN_MODULES},
    compaction::{self, LATCH_BYTE, LATCH_BYTE_ALIGNED},
    matrix::{row_indicators, START_MODULES, STOP_MODULES},
    reed_solomon, Codeword, EcLevel, SymbolError, SymbolMatrix, SymbolOptions,
};
use proptest::prelude::*;

fn options(level: u8, max_columns: u8) -> SymbolOptions {
    SymbolOptions {
        ec_level: EcLevel::new(level).unwrap(),
        max_columns,
    }
}

/// Checks the structure of every row and returns the codewords read back
/// from the data blocks, padding included.
fn check_structure(symbol: &SymbolMatrix) -> Vec<Codeword> {
    let mut read = Vec::new();

    for (y, row) in symbol.rows().enumerate() {
        assert_eq!(row.len(), symbol.width());
        assert!(row.iter().all(|&m| m == 0 || m == 1));

        let blocks: Vec<&[u8]> = row[START_MODULES..row.len() - STOP_MODULES]
            .chunks_exact(PATTERN_MODULES)
            .collect();
        assert_eq!(blocks.len(), symbol.columns() + 2);

        for block in &blocks {
            let runs: Pattern = run_lengths(block).try_into().unwrap();
            assert!(runs.iter().all(|w| (1..=6).contains(w)));
            assert_eq!(runs.iter().map(|&w| w as usize).sum::<usize>(), 17);
            assert_eq!(cluster_of(&runs), Some(y % 3));
        }

        let (left, right) = row_indicators(y, symbol.height(), symbol.columns(), symbol.ec_level());
        assert_eq!(run_lengths(blocks[0]), cluster::pattern(left, y % 3));
        assert_eq!(
            run_lengths(blocks[blocks.len() - 1]),
            cluster::pattern(right, y % 3)
        );

        let table = cluster::table(y % 3);
        for block in &blocks[1..blocks.len() - 1] {
            let runs = run_lengths(block);
            let index = table.iter().position(|p| p[..] == runs[..]).unwrap();
            read.push(index as Codeword);
        }
    }

    read
}

#[test]
fn aamva_sized_payload() {
    let payload = b"@\n\x1e\rANSI 636001100001DL00310046DLDAQV12345678\nDCSVERA\nDACSEAN\n\r";
    let symbol = pdf417::encode(payload, &SymbolOptions::default()).unwrap();

    let data = pdf417::data_codewords(payload, EcLevel::default()).unwrap();
    assert_eq!(data[0] as usize, symbol.codewords().len());
    assert_eq!(data[1], LATCH_BYTE);
    assert_eq!(&symbol.codewords()[..data.len()], &data[..]);

    let read = check_structure(&symbol);
    assert_eq!(&read[..symbol.codewords().len()], symbol.codewords());
    assert!(read[symbol.codewords().len()..].iter().all(|&c| c == 900));
}

#[test]
fn error_correction_roots() {
    let symbol = pdf417::encode(b"DCSVERA\nDACSEAN\n", &options(4, 12)).unwrap();

    for i in 0..EcLevel::new(4).unwrap().codeword_count() {
        let root = reed_solomon::pow(reed_solomon::PRIMITIVE, i);
        assert_eq!(reed_solomon::evaluate(symbol.codewords(), root), 0);
    }
}

#[test]
fn byte_compaction_groups() {
    let six = compaction::compact(b"636001");
    assert_eq!(six[0], LATCH_BYTE_ALIGNED);
    assert_eq!(six.len(), 1 + 5);
    assert_eq!(
        compaction::unpack_group(&six[1..6].try_into().unwrap()),
        *b"636001"
    );

    let seven = compaction::compact(b"6360011");
    assert_eq!(seven[0], LATCH_BYTE);
    assert_eq!(seven.len(), 1 + 5 + 1);
    assert_eq!(&seven[1..6], &six[1..6]);
    assert_eq!(seven[6], b'1' as Codeword);
}

#[test]
fn empty_payload() {
    let symbol = pdf417::encode(&[], &options(0, 30)).unwrap();

    // length descriptor, latch, 2 error correction codewords
    assert_eq!(symbol.codewords().len(), 4);
    assert_eq!(symbol.codewords()[..2], [4, LATCH_BYTE_ALIGNED]);
    assert_eq!(symbol.height(), 1);
    check_structure(&symbol);
}

#[test]
fn limits() {
    assert!(matches!(
        pdf417::encode(&[0; 1000], &SymbolOptions::default()),
        Err(SymbolError::CapacityExceeded { .. })
    ));
    assert!(matches!(
        pdf417::encode(&[0; 200], &options(5, 2)),
        Err(SymbolError::TooManyRows { .. })
    ));
    assert_eq!(
        pdf417::encode(b"A", &options(0, 0)),
        Err(SymbolError::InvalidColumns(0))
    );
}

#[test]
fn text_rendering() {
    let symbol = pdf417::encode(b"ANSI ", &options(0, 3)).unwrap();
    let text = symbol.to_string();

    assert_eq!(text.lines().count(), symbol.height());
    assert!(text
        .lines()
        .all(|line| line.chars().count() == symbol.width()));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn random_payloads(
        bytes in proptest::collection::vec(any::<u8>(), 0..300),
        level in 0u8..=4,
        max_columns in 1u8..=30,
    ) {
        let options = options(level, max_columns);
        match pdf417::encode(&bytes, &options) {
            Ok(symbol) => {
                let read = check_structure(&symbol);
                prop_assert_eq!(&read[..symbol.codewords().len()], symbol.codewords());
                prop_assert_eq!(symbol.height(), symbol.codewords().len().div_ceil(symbol.columns()));
            }
            Err(SymbolError::TooManyRows { rows, .. }) => prop_assert!(rows > 90),
            Err(e) => prop_assert!(false, "unexpected error {}", e),
        }
    }
}
