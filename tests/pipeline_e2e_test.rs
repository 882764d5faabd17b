// ==========================================
// 数据管道端到端测试
// ==========================================
// 测试目标: 生成 → 转换 → 导入 全流程
// - CSV 成绩 = 源成绩 + 10，入库成绩 = CSV 成绩 - 5
// - 列不足的行不进入 CSV 也不进入数据库
// - 导入成功 / 失败后中转目录无残留
// ==========================================


use calamine::{open_workbook, Data, Reader, Xlsx};
use std::fs::File;
use std::path::Path;
use student_pipeline::api::ApiError;
use student_pipeline::logging;
use student_pipeline::StudentRepository;
use test_helpers::{read_csv_rows, write_sheet, SheetCell, TestEnv};

/// 读取生成文件中的 (学号, 成绩)
fn source_scores(path: &Path) -> Vec<(i64, i64)> {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    let range = workbook.worksheet_range("Students").unwrap();
    range
        .rows()
        .skip(1)
        .map(|row| {
            let id = match &row[0] {
                Data::Float(f) => *f as i64,
                other => panic!("unexpected id cell {:?}", other),
            };
            let score = match &row[5] {
                Data::Float(f) => *f as i64,
                other => panic!("unexpected score cell {:?}", other),
            };
            (id, score)
        })
        .collect()
}

#[test]
fn test_generate_convert_import_five_records() {
    logging::init_test();
    let env = TestEnv::new();
    let data_api = env.data_api();

    // 1. 生成
    let generated = data_api.generate(5).unwrap();
    assert!(generated.file_name.starts_with("students_5_"));
    assert!(generated.file_name.ends_with(".xlsx"));
    assert_eq!(generated.download_link, format!("/api/download/{}", generated.file_name));
    let source = source_scores(Path::new(&generated.file_path));
    assert_eq!(source.len(), 5);

    // 2. 转换
    let converted = data_api
        .convert_excel_to_csv(File::open(&generated.file_path).unwrap())
        .unwrap();
    assert_eq!(converted.rows_written, 5);
    assert_eq!(converted.rows_skipped, 0);
    assert!(converted.file.file_name.starts_with("converted_"));

    let csv_rows = read_csv_rows(Path::new(&converted.file.file_path));
    assert_eq!(csv_rows[0], vec!["studentId", "firstName", "lastName", "DOB", "class", "score"]);
    let csv_data = &csv_rows[1..];
    assert_eq!(csv_data.len(), 5);
    for (row, (id, score)) in csv_data.iter().zip(&source) {
        assert_eq!(row[0], id.to_string());
        assert_eq!(row[5].parse::<i64>().unwrap(), score + 10);
    }

    // 3. 导入
    let uploaded = data_api
        .upload_csv(File::open(&converted.file.file_path).unwrap())
        .unwrap();
    assert_eq!(uploaded.rows_imported, 5);
    assert_eq!(env.repo.count().unwrap(), 5);

    let stored = env.repo.find_all().unwrap();
    for (record, row) in stored.iter().zip(csv_data) {
        assert_eq!(record.id.to_string(), row[0]);
        assert_eq!(record.first_name, row[1]);
        assert_eq!(record.dob_text(), row[3]);
        assert_eq!(record.score, Some(row[5].parse::<i64>().unwrap() - 5));
    }

    assert_eq!(env.temp_file_count(), 0);
}

#[test]
fn test_short_and_unparsable_rows() {
    logging::init_test();
    let env = TestEnv::new();
    let data_api = env.data_api();

    let sheet = write_sheet(
        env.root.path(),
        "upload.xlsx",
        &[
            vec![SheetCell::Text("ignored header")],
            vec![
                SheetCell::Number(1.0),
                SheetCell::Text("ANN"),
                SheetCell::Text("LEE"),
                SheetCell::Text("2004/02/09"),
                SheetCell::Text("Class1"),
                SheetCell::Number(60.0),
            ],
            // 只有 5 列，跳过
            vec![
                SheetCell::Number(2.0),
                SheetCell::Text("BOB"),
                SheetCell::Text("KIM"),
                SheetCell::Text("2004-01-01"),
                SheetCell::Text("Class2"),
            ],
            // 成绩无法解析
            vec![
                SheetCell::Number(3.0),
                SheetCell::Text("CY"),
                SheetCell::Text("LI"),
                SheetCell::Blank,
                SheetCell::Text("Class3"),
                SheetCell::Text("absent"),
            ],
        ],
    );

    let converted = data_api.convert_excel_to_csv(File::open(&sheet).unwrap()).unwrap();
    assert_eq!(converted.rows_written, 2);
    assert_eq!(converted.rows_skipped, 1);

    let csv_rows = read_csv_rows(Path::new(&converted.file.file_path));
    assert_eq!(csv_rows[1], vec!["1", "ANN", "LEE", "2004-02-09", "Class1", "70"]);
    assert_eq!(csv_rows[2], vec!["3", "CY", "LI", "", "Class3", "10"]);

    data_api
        .upload_csv(File::open(&converted.file.file_path).unwrap())
        .unwrap();
    let stored = env.repo.find_all().unwrap();
    let ids: Vec<i64> = stored.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(stored[0].score, Some(65));
    // 源成绩无法解析：CSV 为 10，入库为 5
    assert_eq!(stored[1].score, Some(5));
    assert_eq!(stored[1].date_of_birth, None);
}

#[test]
fn test_import_skips_short_records_and_recodes_bad_scores() {
    logging::init_test();
    let env = TestEnv::new();

    let csv = "studentId,firstName,lastName,DOB,class,score\n\
               10,ANN,LEE,2004-02-09,Class1,70\n\
               11,BOB,KIM,2004-01-01\n\
               12,CY,LI,,Class2,n/a\n";
    let response = env.data_api().upload_csv(csv.as_bytes()).unwrap();

    assert_eq!(response.rows_read, 3);
    assert_eq!(response.rows_skipped, 1);
    assert_eq!(response.rows_imported, 2);

    let stored = env.repo.find_all().unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].score, Some(65));
    assert_eq!(stored[1].id, 12);
    assert_eq!(stored[1].score, Some(-5));
    assert_eq!(stored[1].class_label.as_deref(), Some("Class2"));
    assert_eq!(env.temp_file_count(), 0);
}

#[test]
fn test_failed_bulk_load_rolls_back_and_cleans_up() {
    logging::init_test();
    let env = TestEnv::new();

    let csv = "studentId,firstName,lastName,DOB,class,score\n\
               1,ANN,LEE,2004-02-09,Class1,70\n\
               2,BOB,KIM,not-a-date,Class1,70\n";
    let result = env.data_api().upload_csv(csv.as_bytes());

    match result {
        Err(ApiError::ImportError(msg)) => assert!(msg.contains("CHECK"), "{}", msg),
        other => panic!("expected import error, got {:?}", other),
    }
    assert_eq!(env.repo.count().unwrap(), 0);
    assert_eq!(env.temp_file_count(), 0);
}

#[test]
fn test_headerless_upload_and_bad_workbook() {
    logging::init_test();
    let env = TestEnv::new();
    let data_api = env.data_api();

    assert!(matches!(data_api.upload_csv(&b""[..]), Err(ApiError::ImportError(_))));

    let result = data_api.convert_excel_to_csv(&b"plain text, not a workbook"[..]);
    assert!(matches!(result, Err(ApiError::ImportError(_))));

    // 失败的操作不发布文件
    assert!(env.data_files().is_empty());
    assert_eq!(env.temp_file_count(), 0);
}

#[test]
fn test_header_width_does_not_affect_data_rows() {
    logging::init_test();

    // 表头多一列（尾随逗号）/ 少一列，数据行均为 6 列
    let headers = [
        "studentId,firstName,lastName,DOB,class,score,",
        "studentId,firstName,lastName,DOB,class",
    ];
    for header in headers {
        let env = TestEnv::new();
        let csv = format!(
            "{}\n1,ANN,LEE,2004-02-09,Class1,70\n2,BOB,KIM,,Class2,oops\n",
            header
        );
        let response = env.data_api().upload_csv(csv.as_bytes()).unwrap();
        assert_eq!(response.rows_imported, 2, "header: {}", header);

        let stored = env.repo.find_all().unwrap();
        assert_eq!(stored[0].score, Some(65));
        assert_eq!(stored[1].score, Some(-5));
        assert_eq!(env.temp_file_count(), 0);
    }
}

#[test]
fn test_spool_failure_reported_as_write_error() {
    logging::init_test();
    let env = TestEnv::new();
    let data_api = env.data_api();
    std::fs::remove_dir(&env.config.temp_dir).unwrap();

    let csv = "studentId,firstName,lastName,DOB,class,score\n1,ANN,LEE,2004-02-09,Class1,70\n";
    match data_api.upload_csv(csv.as_bytes()) {
        Err(ApiError::ImportError(msg)) => assert!(msg.starts_with("文件写入失败"), "{}", msg),
        other => panic!("expected write error, got {:?}", other),
    }
    match data_api.convert_excel_to_csv(&b"PK"[..]) {
        Err(ApiError::ImportError(msg)) => assert!(msg.starts_with("文件写入失败"), "{}", msg),
        other => panic!("expected write error, got {:?}", other),
    }
    assert_eq!(env.repo.count().unwrap(), 0);
}
