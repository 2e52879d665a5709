use crate::schema::StudentRecord;

const SAMPLE: &[[&str; 6]] = &[
    ["10A", "Иванов А.И.", "5", "4", "5", "4"],
    ["10A", "Петрова С.К.", "4", "5", "4", "5"],
    ["10B", "Сидоров Д.М.", "3", "4", "4", "3"],
    ["10B", "Козлова М.П.", "5", "3", "5", "4"],
    ["11A", "Николаев В.С.", "4", "4", "3", "5"],
    ["11A", "Орлова Е.Д.", "5", "5", "5", "4"],
];

/// Demo journal: three classes, two students each, every subject graded.
pub fn sample_records() -> Vec<StudentRecord> {
    SAMPLE
        .iter()
        .map(|[class, name, math, russian, physics, literature]| StudentRecord {
            class: class.to_string(),
            full_name: name.to_string(),
            math: math.to_string(),
            russian: russian.to_string(),
            physics: physics.to_string(),
            literature: literature.to_string(),
            ..Default::default()
        })
        .collect()
}
