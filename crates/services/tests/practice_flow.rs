use std::sync::Arc;

use math_core::model::{
    Grade, Level, LevelId, Problem, ProblemId, ProblemKind, User, UserId,
};
use math_core::session::{PracticeSession, ProblemState};
use math_core::time::{fixed_clock, fixed_now};
use services::{
    CompleteLevel, CompletionOutcome, PracticeError, PracticeService, SubmitAnswer,
};
use storage::repository::{
    AttemptRepository, InMemoryRepository, LevelRepository, ProgressRepository, UserRepository,
};

struct Fixture {
    repo: InMemoryRepository,
    service: PracticeService,
    user: User,
    level: Level,
    problems: Vec<Problem>,
}

async fn fixture(grade: Grade, problem_count: u32) -> Fixture {
    let repo = InMemoryRepository::new();
    let now = fixed_now();

    let user = User::new(UserId::generate(), "Test", "🎓", grade, now).unwrap();
    repo.insert_user(&user).await.unwrap();

    let level = Level::new(
        LevelId::generate(),
        grade,
        1,
        "Test Level",
        None,
        problem_count,
    )
    .unwrap();
    repo.insert_level(&level).await.unwrap();

    let mut problems = Vec::new();
    for i in 0..problem_count {
        let answer = i64::from(i) + 2;
        let problem = Problem::new(
            ProblemId::generate(),
            level.id(),
            format!("1 + {} = ?", answer - 1),
            answer,
            vec![answer - 1, answer, answer + 1, answer + 2],
            ProblemKind::Addition,
        )
        .unwrap();
        repo.insert_problem(&problem).await.unwrap();
        problems.push(problem);
    }

    let service = PracticeService::new(
        fixed_clock(),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
    );

    Fixture {
        repo,
        service,
        user,
        level,
        problems,
    }
}

fn submit(fx: &Fixture, problem: &Problem, answer: i64, is_second_attempt: bool) -> SubmitAnswer {
    SubmitAnswer {
        user_id: fx.user.id(),
        level_id: fx.level.id(),
        problem_id: problem.id(),
        answer,
        is_second_attempt,
    }
}

#[tokio::test]
async fn wrong_answer_counts_immediately_for_kindergarten_and_upper_grades() {
    for grade in [Grade::Kindergarten, Grade::Third, Grade::Fourth, Grade::Fifth] {
        let fx = fixture(grade, 5).await;
        let problem = &fx.problems[0];

        let outcome = fx
            .service
            .submit_answer(submit(&fx, problem, problem.answer() + 1, false))
            .await
            .unwrap();
        assert!(!outcome.is_correct);
        assert!(!outcome.offers_second_chance, "grade {grade:?}");
        assert_eq!(outcome.correct_answer, problem.answer());

        let progress = fx
            .repo
            .get_progress(fx.user.id(), fx.level.id())
            .await
            .unwrap()
            .expect("wrong answer is final");
        assert_eq!(progress.total_attempts(), 1);
        assert_eq!(progress.correct_answers(), 0);
    }
}

#[tokio::test]
async fn first_and_second_grade_first_miss_defers_progress() {
    for grade in [Grade::First, Grade::Second] {
        let fx = fixture(grade, 5).await;
        let problem = &fx.problems[0];

        // First miss: logged, second chance offered, no progress row yet.
        let outcome = fx
            .service
            .submit_answer(submit(&fx, problem, problem.answer() + 1, false))
            .await
            .unwrap();
        assert!(outcome.offers_second_chance, "grade {grade:?}");
        assert!(
            fx.repo
                .get_progress(fx.user.id(), fx.level.id())
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(fx.repo.attempts_for_user(fx.user.id()).await.unwrap().len(), 1);

        // Second miss: final, counted once.
        let outcome = fx
            .service
            .submit_answer(submit(&fx, problem, problem.answer() + 1, true))
            .await
            .unwrap();
        assert!(!outcome.offers_second_chance);

        let progress = fx
            .repo
            .get_progress(fx.user.id(), fx.level.id())
            .await
            .unwrap()
            .expect("second attempt is final");
        assert_eq!(progress.total_attempts(), 1);
        assert_eq!(progress.correct_answers(), 0);
        assert_eq!(progress.score(), progress.correct_answers());
        assert_eq!(fx.repo.attempts_for_user(fx.user.id()).await.unwrap().len(), 2);
    }
}

#[tokio::test]
async fn correct_second_attempt_counts_as_correct() {
    let fx = fixture(Grade::First, 5).await;
    let problem = &fx.problems[0];

    fx.service
        .submit_answer(submit(&fx, problem, problem.answer() + 1, false))
        .await
        .unwrap();
    let outcome = fx
        .service
        .submit_answer(submit(&fx, problem, problem.answer(), true))
        .await
        .unwrap();
    assert!(outcome.is_correct);

    let progress = fx
        .repo
        .get_progress(fx.user.id(), fx.level.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(progress.correct_answers(), 1);
    assert_eq!(progress.total_attempts(), 1);
    assert_eq!(progress.score(), 1);
}

#[tokio::test]
async fn score_mirrors_correct_answers_across_updates() {
    let fx = fixture(Grade::Third, 5).await;
    for (i, problem) in fx.problems.iter().enumerate() {
        let answer = if i % 2 == 0 {
            problem.answer()
        } else {
            problem.answer() + 1
        };
        fx.service
            .submit_answer(submit(&fx, problem, answer, false))
            .await
            .unwrap();

        let progress = fx
            .repo
            .get_progress(fx.user.id(), fx.level.id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(progress.score(), progress.correct_answers());
        assert!(progress.total_attempts() >= progress.correct_answers());
    }
}

#[tokio::test]
async fn completion_gate_is_eighty_percent_of_problem_count() {
    // 4 of 5 correct completes; 3 of 5 does not.
    for (correct, should_complete) in [(4_usize, true), (3, false)] {
        let fx = fixture(Grade::Third, 5).await;
        for (i, problem) in fx.problems.iter().enumerate() {
            let answer = if i < correct {
                problem.answer()
            } else {
                problem.answer() + 1
            };
            fx.service
                .submit_answer(submit(&fx, problem, answer, false))
                .await
                .unwrap();
        }

        let outcome = fx
            .service
            .complete_level(CompleteLevel {
                user_id: fx.user.id(),
                level_id: fx.level.id(),
            })
            .await
            .unwrap();

        if should_complete {
            assert!(matches!(outcome, CompletionOutcome::Completed { .. }));
            let progress = fx
                .repo
                .get_progress(fx.user.id(), fx.level.id())
                .await
                .unwrap()
                .unwrap();
            assert!(progress.is_completed());
        } else {
            assert_eq!(outcome, CompletionOutcome::NeedsMorePractice);
        }
    }
}

#[tokio::test]
async fn completion_without_progress_needs_more_practice() {
    let fx = fixture(Grade::First, 5).await;
    let outcome = fx
        .service
        .complete_level(CompleteLevel {
            user_id: fx.user.id(),
            level_id: fx.level.id(),
        })
        .await
        .unwrap();
    assert_eq!(outcome, CompletionOutcome::NeedsMorePractice);
}

#[tokio::test]
async fn repeated_completion_keeps_original_timestamp() {
    let fx = fixture(Grade::Third, 5).await;
    for problem in &fx.problems {
        fx.service
            .submit_answer(submit(&fx, problem, problem.answer(), false))
            .await
            .unwrap();
    }

    let complete = CompleteLevel {
        user_id: fx.user.id(),
        level_id: fx.level.id(),
    };
    let first = fx.service.complete_level(complete.clone()).await.unwrap();
    let second = fx.service.complete_level(complete).await.unwrap();
    assert_eq!(first, second);

    let CompletionOutcome::Completed { completed_at } = first else {
        panic!("expected completion");
    };
    assert_eq!(completed_at, fixed_now());
}

#[tokio::test]
async fn unknown_problem_and_user_surface_distinct_not_found() {
    let fx = fixture(Grade::First, 5).await;

    let err = fx
        .service
        .submit_answer(SubmitAnswer {
            user_id: fx.user.id(),
            level_id: fx.level.id(),
            problem_id: ProblemId::generate(),
            answer: 5,
            is_second_attempt: false,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PracticeError::ProblemNotFound));

    let err = fx
        .service
        .submit_answer(SubmitAnswer {
            user_id: UserId::generate(),
            level_id: fx.level.id(),
            problem_id: fx.problems[0].id(),
            answer: 5,
            is_second_attempt: false,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PracticeError::UserNotFound));

    // Neither failed lookup touched progress.
    assert!(
        fx.repo
            .get_progress(fx.user.id(), fx.level.id())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn session_machine_tracks_a_full_second_chance_play() {
    let fx = fixture(Grade::Second, 2).await;
    let mut session =
        PracticeSession::new(fx.user.grade(), fx.problems.len()).unwrap();

    // First problem: miss, retry with hints, then get it right.
    let problem = &fx.problems[session.current_index()];
    let outcome = fx
        .service
        .submit_answer(submit(&fx, problem, problem.answer() + 1, false))
        .await
        .unwrap();
    session.apply(outcome.graded());
    assert_eq!(session.state(), ProblemState::FirstWrong);

    session.try_again().unwrap();
    assert!(session.shows_hints());
    let outcome = fx
        .service
        .submit_answer(submit(
            &fx,
            problem,
            problem.answer(),
            session.is_showing_second_chance(),
        ))
        .await
        .unwrap();
    session.apply(outcome.graded());
    assert_eq!(session.state(), ProblemState::Answered);
    session.advance().unwrap();

    // Second problem: right the first time.
    let problem = &fx.problems[session.current_index()];
    let outcome = fx
        .service
        .submit_answer(submit(&fx, problem, problem.answer(), false))
        .await
        .unwrap();
    session.apply(outcome.graded());

    assert_eq!(session.score(), 2);
    assert_eq!(session.total_answered(), 2);
    assert!(session.can_complete());

    let progress = fx
        .repo
        .get_progress(fx.user.id(), fx.level.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(progress.correct_answers(), 2);
    assert_eq!(progress.total_attempts(), 2);
}
