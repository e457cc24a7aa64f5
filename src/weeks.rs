//! 훈련 주차 카탈로그와 조회 도우미.

use chrono::NaiveDate;

/// 주차 선택지 1건.
#[derive(Clone, Copy, Debug)]
pub struct WeekOption {
    /// payload 구성과 유효성 검사에 쓰는 안정 ID.
    pub id: &'static str,
    /// 화면과 payload에 쓰는 표시 라벨.
    pub label: &'static str,
    /// 해당 주차의 교재 주제(없을 수 있음).
    pub topic: Option<&'static str>,
    /// 묶음 표시용 섹션(권 구분, 없을 수 있음).
    pub section: Option<&'static str>,
    /// 주차 시작일(YYYY-MM-DD, 없을 수 있음).
    pub start_date: Option<&'static str>,
}

/// 1권 섹션 라벨.
const BOOK1: &str = "1권: 비전의 사람 (상반기)";
/// 2권 섹션 라벨.
const BOOK2: &str = "2권: 성령의 사람 (하반기)";

/// 2026년 1학기 제자훈련 연간 계획.
pub const TRAINING_WEEKS: &[WeekOption] = &[
    // 1권: 비전의 사람
    WeekOption {
        id: "week-0",
        label: "OT",
        topic: None,
        section: Some(BOOK1),
        start_date: Some("2026-01-25"),
    },
    WeekOption {
        id: "week-1",
        label: "1주차",
        topic: Some("1-1 내가 만난 예수님"),
        section: Some(BOOK1),
        start_date: Some("2026-02-01"),
    },
    WeekOption {
        id: "week-2",
        label: "2주차",
        topic: Some("1-2 제자란 누구인가"),
        section: Some(BOOK1),
        start_date: Some("2026-02-08"),
    },
    WeekOption {
        id: "week-3",
        label: "3주차",
        topic: Some("1-3 하나님의 주재권"),
        section: Some(BOOK1),
        start_date: Some("2026-02-22"),
    },
    WeekOption {
        id: "week-4",
        label: "4주차",
        topic: Some("1-4 영적전쟁"),
        section: Some(BOOK1),
        start_date: Some("2026-03-01"),
    },
    WeekOption {
        id: "week-5",
        label: "5주차",
        topic: Some("1-5 무릎으로 승부하라"),
        section: Some(BOOK1),
        start_date: Some("2026-03-08"),
    },
    WeekOption {
        id: "week-6",
        label: "6주차",
        topic: Some("1-6 성경의 권위 (암송시험)"),
        section: Some(BOOK1),
        start_date: Some("2026-03-15"),
    },
    WeekOption {
        id: "week-7",
        label: "7주차",
        topic: Some("1-7 하나님은 누구신가?"),
        section: Some(BOOK1),
        start_date: Some("2026-03-22"),
    },
    WeekOption {
        id: "week-8",
        label: "8주차",
        topic: Some("1-8 인간은 누구인가?"),
        section: Some(BOOK1),
        start_date: Some("2026-03-29"),
    },
    WeekOption {
        id: "week-9",
        label: "9주차",
        topic: Some("1-9 예수 그리스도는 누구신가?"),
        section: Some(BOOK1),
        start_date: Some("2026-04-05"),
    },
    WeekOption {
        id: "week-10",
        label: "10주차",
        topic: Some("1-10 십자가와 구원"),
        section: Some(BOOK1),
        start_date: Some("2026-04-12"),
    },
    WeekOption {
        id: "week-11",
        label: "11주차",
        topic: Some("1-11 성령 하나님은 누구신가? (암송시험)"),
        section: Some(BOOK1),
        start_date: Some("2026-04-19"),
    },
    WeekOption {
        id: "week-12",
        label: "12주차",
        topic: Some("1-12 거룩한 삶 (1권 중간고사)"),
        section: Some(BOOK1),
        start_date: Some("2026-04-26"),
    },
    // 2권: 성령의 사람
    WeekOption {
        id: "week-13",
        label: "13주차",
        topic: Some("공동체 연합의 시간"),
        section: Some(BOOK2),
        start_date: Some("2026-05-03"),
    },
    // 같은 주간이라 별도 시작일 없음.
    WeekOption {
        id: "week-14",
        label: "14주차",
        topic: Some("2-1 교회란 무엇인가"),
        section: Some(BOOK2),
        start_date: None,
    },
    WeekOption {
        id: "week-15",
        label: "15주차",
        topic: Some("2-2 예수 그리스도의 재림과 영원한 소망"),
        section: Some(BOOK2),
        start_date: Some("2026-05-10"),
    },
    WeekOption {
        id: "week-16",
        label: "16주차",
        topic: Some("2-3 주가 오실 길을 예비하라"),
        section: Some(BOOK2),
        start_date: Some("2026-05-17"),
    },
    WeekOption {
        id: "week-17",
        label: "17주차",
        topic: Some("2-4 하나님의 임재가 충만한 예배"),
        section: Some(BOOK2),
        start_date: Some("2026-05-24"),
    },
    WeekOption {
        id: "week-18",
        label: "18주차",
        topic: Some("2-5 순종의 삶"),
        section: Some(BOOK2),
        start_date: Some("2026-05-31"),
    },
    // 같은 주간이라 별도 시작일 없음.
    WeekOption {
        id: "week-19",
        label: "19주차",
        topic: Some("2-6 말의 능력 (암송시험)"),
        section: Some(BOOK2),
        start_date: None,
    },
    WeekOption {
        id: "week-20",
        label: "20주차",
        topic: Some("2-7 재정 관리"),
        section: Some(BOOK2),
        start_date: Some("2026-06-07"),
    },
    WeekOption {
        id: "week-21",
        label: "21주차",
        topic: Some("2-8 다음세대를 준비하라"),
        section: Some(BOOK2),
        start_date: Some("2026-06-14"),
    },
    WeekOption {
        id: "week-22",
        label: "22주차",
        topic: Some("2-9 섬김과 나눔을 실천하라"),
        section: Some(BOOK2),
        start_date: Some("2026-06-21"),
    },
    WeekOption {
        id: "week-23",
        label: "23주차",
        topic: Some("2-10 영향력 있는 사람을 세우라 (최종 암송)"),
        section: Some(BOOK2),
        start_date: Some("2026-06-28"),
    },
    WeekOption {
        id: "week-24",
        label: "24주차",
        topic: Some("2-11 비전의 사람이 되라 (2권 기말고사)"),
        section: Some(BOOK2),
        start_date: Some("2026-07-05"),
    },
];

/// id로 주차 선택지를 찾는다.
pub fn find(id: &str) -> Option<&'static WeekOption> {
    TRAINING_WEEKS.iter().find(|w| w.id == id)
}

/// id로 표시 라벨을 찾는다. 모르는 id는 "Unknown"으로 처리한다.
pub fn label_by_id(id: &str) -> &'static str {
    find(id).map(|w| w.label).unwrap_or("Unknown")
}

/// 카탈로그에 존재하는 id인지 검사한다.
pub fn is_valid_id(id: &str) -> bool {
    find(id).is_some()
}

/// 카탈로그 내 위치를 찾는다(주차 선택 UI의 순환 이동용).
pub fn index_of(id: &str) -> Option<usize> {
    TRAINING_WEEKS.iter().position(|w| w.id == id)
}

/// 기준일까지 시작일이 지난 가장 늦은 주차 id를 돌려준다.
///
/// 화면에서 주차를 미리 골라 주는 편의 기능이다. 시작일이 없는 주차는
/// 건너뛰고, 아직 아무 주차도 시작 전이면 None을 돌려준다.
pub fn current_week_id(today: NaiveDate) -> Option<&'static str> {
    let mut current = None;
    for w in TRAINING_WEEKS {
        let Some(s) = w.start_date else { continue };
        let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") else {
            continue;
        };
        // 카탈로그는 날짜순이므로 덮어쓰면 가장 늦은 주차가 남는다.
        if d <= today {
            current = Some(w.id);
        }
    }
    current
}
