use super::Task;

/// Display key: incomplete before completed, then by priority rank.
pub fn sort_key(task: &Task) -> (bool, u8) {
    (task.completed, task.priority.rank())
}

/// Returns the tasks in display order. The sort is stable, so tasks with
/// equal keys keep their input order. The input is left untouched.
pub fn sort_tasks(tasks: &[Task]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by_key(sort_key);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Priority, TaskId};

    fn task(id: &str, priority: Priority, completed: bool) -> Task {
        Task {
            id: TaskId::new(id),
            title: format!("task {id}"),
            description: String::new(),
            priority,
            completed,
            owner_id: None,
        }
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn incomplete_high_first_then_completed() {
        let tasks = vec![
            task("1", Priority::Low, false),
            task("2", Priority::High, true),
            task("3", Priority::High, false),
        ];

        assert_eq!(ids(&sort_tasks(&tasks)), vec!["3", "1", "2"]);
    }

    #[test]
    fn equal_keys_keep_input_order() {
        let tasks = vec![
            task("a", Priority::Medium, false),
            task("b", Priority::High, false),
            task("c", Priority::Medium, false),
            task("d", Priority::Medium, false),
        ];

        assert_eq!(ids(&sort_tasks(&tasks)), vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn completed_always_after_incomplete() {
        let tasks = vec![
            task("1", Priority::High, true),
            task("2", Priority::Low, false),
            task("3", Priority::Medium, true),
            task("4", Priority::Low, true),
            task("5", Priority::Medium, false),
        ];

        let sorted = sort_tasks(&tasks);
        let first_completed = sorted.iter().position(|t| t.completed).unwrap();
        assert!(sorted[first_completed..].iter().all(|t| t.completed));
        assert!(sorted[..first_completed].iter().all(|t| !t.completed));

        let ranks: Vec<u8> = sorted[..first_completed]
            .iter()
            .map(|t| t.priority.rank())
            .collect();
        assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn input_is_not_reordered() {
        let tasks = vec![
            task("1", Priority::Low, false),
            task("2", Priority::High, false),
        ];
        let _ = sort_tasks(&tasks);
        assert_eq!(ids(&tasks), vec!["1", "2"]);
    }

    #[test]
    fn empty_list() {
        assert!(sort_tasks(&[]).is_empty());
    }
}
