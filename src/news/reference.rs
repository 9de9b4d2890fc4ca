//! Normal ranges for common health metrics in healthy adults.

/// One row of the reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceRange {
    pub metric: &'static str,
    pub normal_range: &'static str,
    pub notes: &'static str,
}

pub const DISCLAIMER: &str = "Consult a doctor for personalized advice. \
Values may vary by age, sex, and health conditions.";

pub const REFERENCE_RANGES: &[ReferenceRange] = &[
    ReferenceRange {
        metric: "Blood Sugar (Fasting)",
        normal_range: "70-99 mg/dL",
        notes: "Prediabetes: 100-125 mg/dL; Diabetes: 126+ mg/dL",
    },
    ReferenceRange {
        metric: "Blood Sugar (Random)",
        normal_range: "<140 mg/dL",
        notes: "Measured at any time of day regardless of meals",
    },
    ReferenceRange {
        metric: "Blood Pressure",
        normal_range: "<120/80 mmHg",
        notes: "Elevated: 120-129/<80; Hypertension: 130+/80+",
    },
    ReferenceRange {
        metric: "Hemoglobin",
        normal_range: "Men: 13.8-17.2 g/dL; Women: 12.1-15.1 g/dL",
        notes: "Varies by age and gender; low levels indicate anemia",
    },
    ReferenceRange {
        metric: "Total Cholesterol",
        normal_range: "<200 mg/dL",
        notes: "LDL <100 mg/dL; HDL >60 mg/dL",
    },
    ReferenceRange {
        metric: "Body Mass Index (BMI)",
        normal_range: "18.5-24.9",
        notes: "Underweight <18.5; Overweight 25+; Obesity 30+",
    },
    ReferenceRange {
        metric: "Hemoglobin A1C",
        normal_range: "<5.7%",
        notes: "Prediabetes: 5.7-6.4%; Diabetes: 6.5%+",
    },
    ReferenceRange {
        metric: "Resting Heart Rate",
        normal_range: "60-100 bpm",
        notes: "Well-trained athletes may rest below 60 bpm",
    },
];
