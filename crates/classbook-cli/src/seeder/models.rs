//! Configuration for how much fake data a seeding run generates.

/// Number of records to create per entity family.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub grades: usize,
    pub classrooms: usize,
    pub students: usize,
    pub teachers: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            grades: 5,
            classrooms: 12,
            students: 100,
            teachers: 10,
        }
    }
}

impl SeedConfig {
    pub fn with_grades(mut self, grades: usize) -> Self {
        self.grades = grades;
        self
    }

    pub fn with_classrooms(mut self, classrooms: usize) -> Self {
        self.classrooms = classrooms;
        self
    }

    pub fn with_students(mut self, students: usize) -> Self {
        self.students = students;
        self
    }

    pub fn with_teachers(mut self, teachers: usize) -> Self {
        self.teachers = teachers;
        self
    }
}

/// Counts of what a seeding run inserted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub grades: usize,
    pub classrooms: usize,
    pub students: usize,
    pub teachers: usize,
}
