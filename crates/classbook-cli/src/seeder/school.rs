//! Grade and Classroom seeding.

use std::time::Instant;

use classbook_core::AppError;
use classbook_db::SchoolStore;
use classbook_db::checks::check_classroom_fields;
use classbook_models::{Classroom, ClassroomInput, Grade, GradeId, GradeInput};
use fake::Fake;
use validator::Validate;

use super::random_subset;

const SUBJECTS: [(&str, &str); 10] = [
    ("Mathematics", "MAT"),
    ("Portuguese", "POR"),
    ("English", "ENG"),
    ("History", "HIS"),
    ("Geography", "GEO"),
    ("Science", "SCI"),
    ("Physical Education", "PHE"),
    ("Arts", "ART"),
    ("Music", "MUS"),
    ("Computing", "CMP"),
];

fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

pub fn generate_grades(count: usize) -> Vec<GradeInput> {
    (1..=count)
        .map(|rank| GradeInput {
            name: format!("{} grade", ordinal(rank)),
            rank: rank as i32,
        })
        .collect()
}

pub fn generate_classrooms(count: usize, tag: &str, grades: &[GradeId]) -> Vec<ClassroomInput> {
    (0..count)
        .map(|i| {
            let (subject, code) = SUBJECTS[i % SUBJECTS.len()];
            let days = random_subset(&[1u8, 2, 3, 4, 5, 6, 7], 3)
                .iter()
                .map(u8::to_string)
                .collect::<Vec<_>>()
                .join(",");
            let grade = (!grades.is_empty()).then(|| grades[i % grades.len()]);

            ClassroomInput {
                name: subject.to_string(),
                identifier: format!("{}-{}-{:03}", code, tag, i + 1),
                room: format!("R{}", (100..400).fake::<u16>()),
                days_of_week: days,
                time: format!(
                    "{:02}:{:02}",
                    (7..18).fake::<u8>(),
                    if (0..2).fake::<u8>() == 0 { 0 } else { 30 }
                ),
                grade,
            }
        })
        .collect()
}

pub async fn insert_grade(store: &dyn SchoolStore, input: GradeInput) -> Result<Grade, AppError> {
    input.validate().map_err(|e| AppError::from_validation(&e))?;
    store.create_grade(input.into_data()).await
}

pub async fn insert_classroom(
    store: &dyn SchoolStore,
    input: ClassroomInput,
) -> Result<Classroom, AppError> {
    let mut errors = input.check();
    check_classroom_fields(
        store,
        Some(&input.identifier),
        input.grade,
        None,
        &mut errors,
    )
    .await?;
    errors.into_result()?;
    store.create_classroom(input.into_data()?).await
}

/// Seeds Grades ranked `1..=count`.
pub async fn seed_grades(store: &dyn SchoolStore, count: usize) -> Result<Vec<Grade>, AppError> {
    let start_time = Instant::now();
    println!("📚 Seeding {} grades...", count);

    let mut grades = Vec::with_capacity(count);
    for input in generate_grades(count) {
        grades.push(insert_grade(store, input).await?);
    }

    println!(
        "   ✓ Inserted {} grades in {:?}",
        grades.len(),
        start_time.elapsed()
    );
    Ok(grades)
}

/// Seeds Classrooms spread round-robin across `grades`.
pub async fn seed_classrooms(
    store: &dyn SchoolStore,
    count: usize,
    tag: &str,
    grades: &[GradeId],
) -> Result<Vec<Classroom>, AppError> {
    let start_time = Instant::now();
    println!("🏫 Seeding {} classrooms...", count);

    let mut classrooms = Vec::with_capacity(count);
    for input in generate_classrooms(count, tag, grades) {
        classrooms.push(insert_classroom(store, input).await?);
    }

    println!(
        "   ✓ Inserted {} classrooms in {:?}",
        classrooms.len(),
        start_time.elapsed()
    );
    Ok(classrooms)
}
